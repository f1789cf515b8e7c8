//! T411 proxy: keeps the taxonomy cache in sync and runs friendly searches.

mod service;
mod types;

pub use service::T411Proxy;
pub use types::{FriendlySearchQuery, ProxyError, SyncSummary};
