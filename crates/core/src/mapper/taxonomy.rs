//! Category tree and term tree mapping.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{json_children, json_i64, MappedCategory};
use crate::taxonomy::{Association, Category, CategoryForest, Term, TermType, TermTypeTree};

/// Map a category node and its `cats` sub-tree.
///
/// Returns `None` for nodes without a usable `id`, `pid` or `name`; such
/// nodes are dropped together with their sub-tree. A `pid` of 0 marks a
/// root category. Nested categories take their parent from the nesting, not
/// from their own `pid`.
pub fn map_category(node: &Value) -> Option<MappedCategory> {
    let id = node.get("id").and_then(json_i64)?;
    let pid = node.get("pid").and_then(json_i64)?;
    let name = node.get("name").and_then(Value::as_str)?;

    let sub_categories = node
        .get("cats")
        .map(json_children)
        .unwrap_or_default()
        .into_iter()
        .filter_map(map_category)
        .map(|mut child| {
            child.category.parent_id = Some(id);
            child
        })
        .collect();

    Some(MappedCategory {
        category: Category {
            id,
            name: name.to_string(),
            parent_id: if pid == 0 { None } else { Some(pid) },
        },
        sub_categories,
    })
}

/// Map the whole category tree into an arena of categories.
pub fn map_category_tree(tree: &Value) -> CategoryForest {
    let mut forest = CategoryForest::default();

    for node in json_children(tree) {
        let Some(mapped) = map_category(node) else {
            continue;
        };

        forest.roots.push(mapped.category.id);
        for category in mapped.flatten() {
            forest.categories.insert(category.id, category.clone());
        }
    }

    forest
}

/// Map a term type node (`type`, `mode` and a `terms` map of id to name).
pub fn map_term_type(term_type_id: i64, node: &Value) -> TermType {
    let text = |field: &str| {
        node.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let terms = node
        .get("terms")
        .and_then(Value::as_object)
        .map(|terms| {
            terms
                .iter()
                .filter_map(|(term_id, term_name)| {
                    Some(Term {
                        id: term_id.trim().parse().ok()?,
                        name: term_name.as_str()?.to_string(),
                        type_id: term_type_id,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    TermType {
        id: term_type_id,
        name: text("type"),
        mode: text("mode"),
        terms,
    }
}

/// Map the term tree, shaped `{category_id: {term_type_id: term_type}}`.
///
/// A term type shared by several categories yields one association per
/// category but is mapped only once.
pub fn map_term_type_tree(tree: &Value) -> TermTypeTree {
    let mut associations = Vec::new();
    let mut term_types: BTreeMap<i64, TermType> = BTreeMap::new();

    let Some(categories) = tree.as_object() else {
        return TermTypeTree::default();
    };

    for (category_key, category_term_types) in categories {
        let Ok(category_id) = category_key.trim().parse::<i64>() else {
            continue;
        };
        let Some(category_term_types) = category_term_types.as_object() else {
            continue;
        };

        for (term_type_key, node) in category_term_types {
            let Ok(term_type_id) = term_type_key.trim().parse::<i64>() else {
                continue;
            };

            associations.push(Association {
                category_id,
                term_type_id,
            });
            term_types
                .entry(term_type_id)
                .or_insert_with(|| map_term_type(term_type_id, node));
        }
    }

    TermTypeTree {
        associations,
        term_types,
    }
}
