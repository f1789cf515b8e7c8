//! Search response mapping.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use super::{json_i64, MapperError, TorrentEntry};

/// Format of the `added` field in search results.
pub const ADDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Privacy level under which T411 discloses the uploader.
const PUBLIC_PRIVACY: &str = "normal";

fn field<'a>(node: &'a Value, name: &'static str) -> Result<&'a Value, MapperError> {
    match node.get(name) {
        None | Some(Value::Null) => Err(MapperError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> MapperError {
    MapperError::InvalidField {
        field: name,
        value: value.to_string(),
    }
}

fn int_field(node: &Value, name: &'static str) -> Result<i64, MapperError> {
    let value = field(node, name)?;
    json_i64(value).ok_or_else(|| invalid(name, value))
}

/// Non-negative counter that must fit the target type.
fn count_field<T: TryFrom<i64>>(node: &Value, name: &'static str) -> Result<T, MapperError> {
    let n = int_field(node, name)?;
    T::try_from(n).map_err(|_| invalid(name, n))
}

fn str_field(node: &Value, name: &'static str) -> Result<String, MapperError> {
    let value = field(node, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(name, value))
}

fn added_field(node: &Value) -> Result<NaiveDateTime, MapperError> {
    let raw = str_field(node, "added")?;
    NaiveDateTime::parse_from_str(&raw, ADDED_FORMAT).map_err(|_| invalid("added", raw))
}

/// Map one entry of a search response.
pub fn map_search_result(node: &Value) -> Result<TorrentEntry, MapperError> {
    let privacy = str_field(node, "privacy")?;

    let (owner, username) = if privacy == PUBLIC_PRIVACY {
        (
            Some(int_field(node, "owner")?),
            Some(str_field(node, "username")?),
        )
    } else {
        (None, None)
    };

    Ok(TorrentEntry {
        id: int_field(node, "id")?,
        name: str_field(node, "name")?,
        category_id: int_field(node, "category")?,
        seeders: count_field(node, "seeders")?,
        leechers: count_field(node, "leechers")?,
        comments: count_field(node, "comments")?,
        is_verified: field(node, "isVerified")?.as_str() == Some("1"),
        added: added_field(node)?,
        size: count_field(node, "size")?,
        times_completed: count_field(node, "times_completed")?,
        owner,
        category_name: str_field(node, "categoryname")?,
        category_image: str_field(node, "categoryimage")?,
        username,
        privacy,
    })
}

/// Map the `torrents` array of a search response.
///
/// Entries that are not JSON objects are skipped.
pub fn map_search_response(response: &Value) -> Result<Vec<TorrentEntry>, MapperError> {
    let torrents = field(response, "torrents")?;
    let torrents = torrents
        .as_array()
        .ok_or_else(|| invalid("torrents", torrents))?;

    let mut entries = Vec::with_capacity(torrents.len());
    for node in torrents {
        if !node.is_object() {
            debug!(entry = %node, "Skipping non-object search entry");
            continue;
        }
        entries.push(map_search_result(node)?);
    }
    Ok(entries)
}
