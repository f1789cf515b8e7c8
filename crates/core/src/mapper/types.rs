//! Types produced by the object mapper.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::taxonomy::Category;

/// A category together with its mapped sub-categories, as found in the
/// upstream tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCategory {
    pub category: Category,
    pub sub_categories: Vec<MappedCategory>,
}

impl MappedCategory {
    /// Visit this category and every descendant, parents first.
    pub fn flatten(&self) -> Vec<&Category> {
        let mut out = vec![&self.category];
        for sub in &self.sub_categories {
            out.extend(sub.flatten());
        }
        out
    }
}

/// A single torrent from a T411 search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentEntry {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub seeders: u32,
    pub leechers: u32,
    pub comments: u32,
    pub is_verified: bool,
    /// Upload time as reported by T411 (server local time).
    pub added: NaiveDateTime,
    /// Total size in bytes.
    pub size: u64,
    pub times_completed: u32,
    /// Uploader id, only disclosed for `normal` privacy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<i64>,
    pub category_name: String,
    pub category_image: String,
    /// Uploader name, only disclosed for `normal` privacy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub privacy: String,
}

/// Errors while mapping a search response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapperError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}
