//! T411 proxy implementation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::{api_error, AuthOutcome, ClientQuery, Credentials, T411Api, TermSelector};
use crate::mapper::{map_category_tree, map_search_response, map_term_type_tree, TorrentEntry};
use crate::taxonomy::{
    Category, CategoryBranch, CategoryRef, Taxonomy, TaxonomyError, TaxonomyStore, TermType,
};

use super::types::{FriendlySearchQuery, ProxyError, SyncSummary};

/// Front door of the T411 integration.
///
/// Combines the REST client with the local taxonomy cache: keeps the cache
/// in sync with upstream and turns friendly queries into API queries.
pub struct T411Proxy {
    api: Arc<dyn T411Api>,
    store: Arc<dyn TaxonomyStore>,
    /// Memoized "at least one category is cached"; `None` until computed.
    has_cached_taxonomy: RwLock<Option<bool>>,
}

impl T411Proxy {
    pub fn new(api: Arc<dyn T411Api>, store: Arc<dyn TaxonomyStore>) -> Self {
        Self {
            api,
            store,
            has_cached_taxonomy: RwLock::new(None),
        }
    }

    /// Replace the API credentials. The next request authenticates again.
    pub async fn set_credentials(&self, username: &str, password: &str) {
        self.api
            .set_credentials(Credentials::new(username, password))
            .await;
        *self.has_cached_taxonomy.write().await = None;
    }

    /// Whether the local cache holds a taxonomy.
    pub async fn has_cached_taxonomy(&self) -> Result<bool, ProxyError> {
        if let Some(cached) = *self.has_cached_taxonomy.read().await {
            return Ok(cached);
        }

        let cached = self.store.category_count()? > 0;
        *self.has_cached_taxonomy.write().await = Some(cached);
        Ok(cached)
    }

    /// Authenticate unless a token is already held. A refusal is an error.
    async fn ensure_authenticated(&self) -> Result<(), ProxyError> {
        if self.api.is_authenticated().await {
            return Ok(());
        }

        match self.api.authenticate().await? {
            AuthOutcome::Authenticated => Ok(()),
            AuthOutcome::Rejected { code, message } => {
                Err(ProxyError::AuthenticationRejected { code, message })
            }
        }
    }

    /// Download the category and term trees and replace the local cache.
    pub async fn synchronize_taxonomy(&self) -> Result<SyncSummary, ProxyError> {
        debug!("Starting T411 taxonomy synchronization");

        self.ensure_authenticated().await?;

        let category_tree = self.api.fetch_category_tree().await?;
        let term_tree = self.api.fetch_term_tree().await?;

        let forest = map_category_tree(&category_tree);
        let term_type_tree = map_term_type_tree(&term_tree);
        let taxonomy = Taxonomy::link(forest, term_type_tree)?;

        let summary = SyncSummary {
            categories: taxonomy.forest().len(),
            root_categories: taxonomy.forest().roots.len(),
            term_types: taxonomy.term_types().count(),
            associations: taxonomy.associations().len(),
        };

        self.store.save_taxonomy(&taxonomy)?;
        *self.has_cached_taxonomy.write().await = None;

        info!(
            categories = summary.categories,
            root_categories = summary.root_categories,
            term_types = summary.term_types,
            associations = summary.associations,
            "T411 taxonomy synchronized"
        );

        Ok(summary)
    }

    /// Look a category up by name.
    ///
    /// Names are not unique upstream: with several matches the first one
    /// (lowest id) is returned and a warning logged.
    pub async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, ProxyError> {
        let mut matches = self.store.categories_named(name)?;

        if matches.is_empty() {
            warn!(category = %name, "No T411 category with this name");
            return Ok(None);
        }

        if matches.len() > 1 {
            warn!(
                category = %name,
                count = matches.len(),
                "Several T411 categories share this name, using the first one"
            );
        }

        Ok(Some(matches.swap_remove(0)))
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>, ProxyError> {
        Ok(self.store.all_categories()?)
    }

    pub async fn all_category_names(&self) -> Result<Vec<String>, ProxyError> {
        Ok(self.store.all_category_names()?)
    }

    pub async fn all_term_names(&self) -> Result<Vec<String>, ProxyError> {
        Ok(self.store.all_term_names()?)
    }

    /// Root categories with their direct sub-categories.
    pub async fn category_tree(&self) -> Result<Vec<CategoryBranch>, ProxyError> {
        let mut branches = Vec::new();
        for category in self.store.root_categories()? {
            let sub_categories = self.store.sub_categories(category.id)?;
            branches.push(CategoryBranch {
                category,
                sub_categories,
            });
        }
        Ok(branches)
    }

    /// Term types (with their terms) usable with a category.
    pub async fn term_types_for_category(
        &self,
        category: &CategoryRef,
    ) -> Result<(Category, Vec<TermType>), ProxyError> {
        let category = match category {
            CategoryRef::Id(id) => self.store.get_category(*id)?,
            CategoryRef::Name(name) => self
                .find_category_by_name(name)
                .await?
                .ok_or_else(|| TaxonomyError::NotFound(format!("category \"{}\"", name)))?,
        };

        let term_types = self.store.term_types_for_category(category.id)?;
        debug!(
            category = %category.name,
            category_id = category.id,
            term_types = term_types.len(),
            "Resolved T411 term types"
        );

        Ok((category, term_types))
    }

    /// Translate a friendly query into the API's vocabulary.
    ///
    /// The category name must match exactly one cached category. Term names
    /// are looked up among the term types of that category only; unknown
    /// names are dropped.
    pub async fn resolve_query(
        &self,
        query: &FriendlySearchQuery,
    ) -> Result<ClientQuery, ProxyError> {
        let mut client_query = ClientQuery {
            expression: query.expression.clone(),
            ..Default::default()
        };

        match &query.category_name {
            Some(name) => {
                let category_id = self.store.category_id_by_name(name)?;
                client_query.category_id = Some(category_id);

                let terms = self.store.find_terms(category_id, &query.term_names)?;
                if terms.len() < query.term_names.len() {
                    debug!(
                        category = %name,
                        requested = query.term_names.len(),
                        resolved = terms.len(),
                        "Some T411 term names did not resolve"
                    );
                }
                client_query.terms = terms
                    .into_iter()
                    .map(|term| TermSelector {
                        term_id: term.id,
                        term_type_id: term.type_id,
                    })
                    .collect();
            }
            None if !query.term_names.is_empty() => {
                debug!(
                    terms = ?query.term_names,
                    "Ignoring T411 term names: no category given"
                );
            }
            None => {}
        }

        if let Some(max_results) = query.max_results {
            client_query.result_per_page = Some(max_results);
            client_query.page_index = Some(0);
        }

        Ok(client_query)
    }

    /// Run a friendly query and map the first page of results.
    pub async fn search(
        &self,
        query: &FriendlySearchQuery,
    ) -> Result<Vec<TorrentEntry>, ProxyError> {
        let client_query = self.resolve_query(query).await?;
        debug!(query = ?client_query, "T411 search");

        self.ensure_authenticated().await?;
        let response = self.api.search(&client_query).await?;
        if let Some((code, message)) = api_error(&response) {
            warn!(code = ?code, error = %message, "T411 search failed");
            return Err(ProxyError::Api { code, message });
        }

        let entries = map_search_response(&response)?;
        debug!(results = entries.len(), "T411 search complete");
        Ok(entries)
    }
}
