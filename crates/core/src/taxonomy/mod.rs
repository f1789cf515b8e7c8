//! T411 taxonomy cache - categories, term types and terms mirrored from the API.
//!
//! The taxonomy is synchronized from upstream by the proxy and read back when
//! translating friendly search queries into API queries.

mod sqlite;
mod types;

pub use sqlite::{SqliteTaxonomyStore, TAXONOMY_SCHEMA_VERSION};
pub use types::*;

use serde::Serialize;
use tracing::info;

/// Trait for taxonomy storage.
pub trait TaxonomyStore: Send + Sync {
    /// Number of stored categories.
    fn category_count(&self) -> Result<u64, TaxonomyError>;

    /// Replace the stored taxonomy with the given one.
    ///
    /// Runs as a single transaction; on error the previous taxonomy is kept.
    fn save_taxonomy(&self, taxonomy: &Taxonomy) -> Result<(), TaxonomyError>;

    /// Get a category by id.
    fn get_category(&self, id: i64) -> Result<Category, TaxonomyError>;

    /// All categories with exactly this name, ordered by id.
    fn categories_named(&self, name: &str) -> Result<Vec<Category>, TaxonomyError>;

    /// Id of the single category with this name.
    ///
    /// Fails with `NotFound` when there is none and `Ambiguous` when there
    /// are several.
    fn category_id_by_name(&self, name: &str) -> Result<i64, TaxonomyError>;

    /// Every stored category, ordered by id.
    fn all_categories(&self) -> Result<Vec<Category>, TaxonomyError>;

    /// Categories without a parent, ordered by id.
    fn root_categories(&self) -> Result<Vec<Category>, TaxonomyError>;

    /// Direct children of a category, ordered by id.
    fn sub_categories(&self, parent_id: i64) -> Result<Vec<Category>, TaxonomyError>;

    fn all_category_names(&self) -> Result<Vec<String>, TaxonomyError>;

    fn all_term_names(&self) -> Result<Vec<String>, TaxonomyError>;

    /// Term types (with their terms) associated with a category.
    fn term_types_for_category(&self, category_id: i64) -> Result<Vec<TermType>, TaxonomyError>;

    /// Terms with one of the given names whose term type is associated
    /// with the category.
    fn find_terms(&self, category_id: i64, term_names: &[String])
        -> Result<Vec<Term>, TaxonomyError>;

    /// Delete every category and term type (terms and links cascade).
    fn purge(&self) -> Result<PurgeStats, TaxonomyError>;
}

/// Row counts removed by [`TaxonomyStore::purge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeStats {
    pub categories: u64,
    pub term_types: u64,
}

/// Host database-cleanup hook: drops the whole taxonomy cache.
pub fn handle_db_cleanup(store: &dyn TaxonomyStore) -> Result<PurgeStats, TaxonomyError> {
    let stats = store.purge()?;
    info!(
        categories = stats.categories,
        term_types = stats.term_types,
        "T411 taxonomy cache purged"
    );
    Ok(stats)
}
