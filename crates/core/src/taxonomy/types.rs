//! Types for the T411 taxonomy (categories, term types, terms).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A torrent category. Categories form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Upstream category id.
    pub id: i64,
    /// Display name (not guaranteed unique upstream).
    pub name: String,
    /// Parent category, `None` for root categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// A family of search terms (e.g. "Langue", "Qualité").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermType {
    pub id: i64,
    pub name: String,
    /// Display/behavior tag from upstream, kept opaque.
    pub mode: String,
    pub terms: Vec<Term>,
}

/// A single search term, owned by a [`TermType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
}

/// A `(category_id, term_type_id)` link recorded while mapping the term tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Association {
    pub category_id: i64,
    pub term_type_id: i64,
}

/// Category forest stored as an arena keyed by id.
///
/// Children are not owned by their parent; they are derived from
/// `parent_id` on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForest {
    /// Root category ids, in upstream order.
    pub roots: Vec<i64>,
    /// Every category of the forest, roots and descendants.
    pub categories: BTreeMap<i64, Category>,
}

impl CategoryForest {
    pub fn get(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Root categories, in upstream order.
    pub fn root_categories(&self) -> impl Iterator<Item = &Category> {
        self.roots.iter().filter_map(|id| self.categories.get(id))
    }

    /// Direct children of a category, ordered by id.
    pub fn children_of(&self, id: i64) -> Vec<&Category> {
        self.categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .collect()
    }

    /// Categories in parent-before-child order, starting from the roots.
    pub fn depth_first(&self) -> Vec<&Category> {
        let mut ordered = Vec::with_capacity(self.categories.len());
        let mut stack: Vec<&Category> = self.root_categories().collect();
        stack.reverse();

        while let Some(category) = stack.pop() {
            ordered.push(category);
            let mut children = self.children_of(category.id);
            children.reverse();
            stack.extend(children);
        }

        ordered
    }
}

/// Output of the term tree mapping: associations plus de-duplicated term types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermTypeTree {
    /// One entry per `(category, term type)` occurrence upstream.
    pub associations: Vec<Association>,
    /// Term types indexed by id, one per distinct id.
    pub term_types: BTreeMap<i64, TermType>,
}

/// The complete taxonomy: category forest, term types, and the
/// category/term-type association table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    forest: CategoryForest,
    term_types: BTreeMap<i64, TermType>,
    associations: Vec<Association>,
}

impl Taxonomy {
    /// Link a category forest with a term type tree.
    ///
    /// Every association must reference a category of the forest and a
    /// term type of the tree.
    pub fn link(forest: CategoryForest, tree: TermTypeTree) -> Result<Self, TaxonomyError> {
        let mut associations: Vec<Association> = Vec::with_capacity(tree.associations.len());

        for association in tree.associations {
            if forest.get(association.category_id).is_none() {
                return Err(TaxonomyError::Inconsistent(format!(
                    "term type {} is linked to unknown category {}",
                    association.term_type_id, association.category_id
                )));
            }
            if !tree.term_types.contains_key(&association.term_type_id) {
                return Err(TaxonomyError::Inconsistent(format!(
                    "category {} is linked to unknown term type {}",
                    association.category_id, association.term_type_id
                )));
            }
            if !associations.contains(&association) {
                associations.push(association);
            }
        }

        Ok(Self {
            forest,
            term_types: tree.term_types,
            associations,
        })
    }

    pub fn forest(&self) -> &CategoryForest {
        &self.forest
    }

    pub fn term_types(&self) -> impl Iterator<Item = &TermType> {
        self.term_types.values()
    }

    pub fn term_type(&self, id: i64) -> Option<&TermType> {
        self.term_types.get(&id)
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Term types associated with a category.
    pub fn term_types_of(&self, category_id: i64) -> Vec<&TermType> {
        self.associations
            .iter()
            .filter(|a| a.category_id == category_id)
            .filter_map(|a| self.term_types.get(&a.term_type_id))
            .collect()
    }

    /// Categories a term type is associated with.
    pub fn categories_of(&self, term_type_id: i64) -> Vec<&Category> {
        self.associations
            .iter()
            .filter(|a| a.term_type_id == term_type_id)
            .filter_map(|a| self.forest.get(a.category_id))
            .collect()
    }
}

/// A root category and its direct sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBranch {
    pub category: Category,
    pub sub_categories: Vec<Category>,
}

/// Reference to a stored category, by id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(i64),
    Name(String),
}

/// Errors for taxonomy operations.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous: {0}")]
    Ambiguous(String),

    #[error("Inconsistent taxonomy: {0}")]
    Inconsistent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for TaxonomyError {
    fn from(e: rusqlite::Error) -> Self {
        TaxonomyError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.to_string(),
            parent_id,
        }
    }

    fn forest() -> CategoryForest {
        let mut categories = BTreeMap::new();
        for c in [
            category(210, "Film/Vidéo", None),
            category(631, "Film", Some(210)),
            category(433, "Série TV", Some(210)),
            category(395, "Audio", None),
            category(623, "Musique", Some(395)),
        ] {
            categories.insert(c.id, c);
        }
        CategoryForest {
            roots: vec![210, 395],
            categories,
        }
    }

    fn term_type(id: i64, name: &str) -> TermType {
        TermType {
            id,
            name: name.to_string(),
            mode: "single".to_string(),
            terms: vec![],
        }
    }

    #[test]
    fn test_children_are_derived_from_parent_id() {
        let forest = forest();
        let children: Vec<i64> = forest.children_of(210).iter().map(|c| c.id).collect();
        assert_eq!(children, vec![433, 631]);
        assert!(forest.children_of(631).is_empty());
    }

    #[test]
    fn test_depth_first_puts_parents_first() {
        let forest = forest();
        let order: Vec<i64> = forest.depth_first().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![210, 433, 631, 395, 623]);
    }

    #[test]
    fn test_link_builds_both_indices() {
        let mut term_types = BTreeMap::new();
        term_types.insert(7, term_type(7, "Langue"));
        term_types.insert(9, term_type(9, "Qualité"));

        let tree = TermTypeTree {
            associations: vec![
                Association { category_id: 631, term_type_id: 7 },
                Association { category_id: 433, term_type_id: 7 },
                Association { category_id: 631, term_type_id: 9 },
            ],
            term_types,
        };

        let taxonomy = Taxonomy::link(forest(), tree).unwrap();

        let of_film: Vec<i64> = taxonomy.term_types_of(631).iter().map(|t| t.id).collect();
        assert_eq!(of_film, vec![7, 9]);

        let of_langue: Vec<i64> = taxonomy.categories_of(7).iter().map(|c| c.id).collect();
        assert_eq!(of_langue, vec![631, 433]);
        assert!(taxonomy.term_types_of(395).is_empty());
    }

    #[test]
    fn test_link_rejects_unknown_category() {
        let mut term_types = BTreeMap::new();
        term_types.insert(7, term_type(7, "Langue"));
        let tree = TermTypeTree {
            associations: vec![Association { category_id: 999, term_type_id: 7 }],
            term_types,
        };

        let result = Taxonomy::link(forest(), tree);
        assert!(matches!(result, Err(TaxonomyError::Inconsistent(_))));
    }

    #[test]
    fn test_link_rejects_unknown_term_type() {
        let tree = TermTypeTree {
            associations: vec![Association { category_id: 631, term_type_id: 7 }],
            term_types: BTreeMap::new(),
        };

        let result = Taxonomy::link(forest(), tree);
        assert!(matches!(result, Err(TaxonomyError::Inconsistent(_))));
    }

    #[test]
    fn test_link_collapses_repeated_pairs() {
        let mut term_types = BTreeMap::new();
        term_types.insert(7, term_type(7, "Langue"));
        let pair = Association { category_id: 631, term_type_id: 7 };
        let tree = TermTypeTree {
            associations: vec![pair, pair],
            term_types,
        };

        let taxonomy = Taxonomy::link(forest(), tree).unwrap();
        assert_eq!(taxonomy.associations().len(), 1);
    }
}
