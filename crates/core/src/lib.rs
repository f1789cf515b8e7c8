pub mod client;
pub mod config;
pub mod mapper;
pub mod proxy;
pub mod taxonomy;
pub mod testing;

pub use client::{
    AuthOutcome, ClientError, ClientQuery, Credentials, T411Api, T411RestClient, TermSelector,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    SanitizedConfig,
};
pub use mapper::{MapperError, TorrentEntry};
pub use proxy::{FriendlySearchQuery, ProxyError, SyncSummary, T411Proxy};
pub use taxonomy::{
    handle_db_cleanup, Category, CategoryBranch, CategoryRef, SqliteTaxonomyStore, Taxonomy,
    TaxonomyError, TaxonomyStore, Term, TermType, TAXONOMY_SCHEMA_VERSION,
};
