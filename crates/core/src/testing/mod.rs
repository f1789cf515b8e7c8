//! Testing utilities: a mock T411 API and JSON fixtures shaped like the
//! real API's responses (ids and counters as strings).
//!
//! # Example
//!
//! ```rust,ignore
//! use t411_core::testing::{fixtures, MockT411Api};
//!
//! let api = MockT411Api::new();
//! api.set_search_response(fixtures::search_response()).await;
//! ```

mod mock_api;

pub use mock_api::{MockT411Api, RecordedCall};

/// Test fixtures.
///
/// The category tree holds two roots, "Film/Vidéo" (210) with 455, 631 and
/// 634, and "Audio" (395) with 623. "Animation" is used by both 455 and 623.
/// A nameless node under "Audio" is dropped by the mapper.
pub mod fixtures {
    use serde_json::{json, Value};

    pub fn category_tree() -> Value {
        json!({
            "210": {
                "id": "210",
                "pid": "0",
                "name": "Film/Vidéo",
                "cats": {
                    "455": {"id": "455", "pid": "210", "name": "Animation"},
                    "631": {"id": "631", "pid": "210", "name": "Film"},
                    "634": {"id": "634", "pid": "210", "name": "Documentaire"}
                }
            },
            "395": {
                "id": "395",
                "pid": "0",
                "name": "Audio",
                "cats": {
                    "623": {"id": "623", "pid": "395", "name": "Animation"},
                    "999": {"id": "999", "pid": "395"}
                }
            }
        })
    }

    /// Term types 7 "Langue" and 9 "Qualité" for the video categories,
    /// 11 "Format" for 623.
    pub fn term_tree() -> Value {
        let langue = json!({
            "type": "Langue",
            "mode": "single",
            "terms": {"15": "VF", "17": "VOSTFR", "18": "MULTI"}
        });
        let qualite = json!({
            "type": "Qualité",
            "mode": "single",
            "terms": {"16": "1080p", "20": "720p"}
        });
        let format = json!({
            "type": "Format",
            "mode": "multi",
            "terms": {"21": "FLAC", "22": "MP3"}
        });

        json!({
            "455": {"7": langue.clone()},
            "631": {"7": langue.clone(), "9": qualite},
            "634": {"7": langue},
            "623": {"11": format}
        })
    }

    pub fn search_entry(id: &str, name: &str, privacy: &str, is_verified: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "category": "631",
            "rewritename": name.to_lowercase().replace(' ', "-"),
            "seeders": "128",
            "leechers": "3",
            "comments": "12",
            "isVerified": is_verified,
            "added": "2014-11-02 18:45:09",
            "size": "1504723001",
            "times_completed": "2471",
            "owner": "98214",
            "categoryname": "Film",
            "categoryimage": "t411-film.png",
            "username": "blender",
            "privacy": privacy
        })
    }

    /// Two results: a verified public one and an unverified private one.
    pub fn search_response() -> Value {
        json!({
            "query": "sintel",
            "offset": "0",
            "limit": "10",
            "total": "2",
            "torrents": [
                search_entry("5237645", "Sintel 2010 MULTi 1080p BluRay x264", "normal", "1"),
                search_entry("5237702", "Sintel 2010 VOSTFR 720p WEB", "strong", "0")
            ]
        })
    }

    pub fn empty_search_response() -> Value {
        json!({
            "query": "",
            "offset": "0",
            "limit": "10",
            "total": "0",
            "torrents": []
        })
    }
}
