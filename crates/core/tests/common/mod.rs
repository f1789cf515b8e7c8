//! In-process fake of the T411 API for integration tests.
//!
//! Serves the fixtures from `t411_core::testing::fixtures` over real HTTP so
//! the REST client is exercised end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use t411_core::config::ApiConfig;

/// Re-export fixtures for test convenience
pub use t411_core::testing::fixtures;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "98214:42:5f4dcc3b5aa765d61d8327deb882cf99";

/// A request received by the fake server.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    /// Raw path and query string, percent-encoding preserved.
    pub path_and_query: String,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct FakeState {
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    category_tree: Arc<Mutex<Option<Value>>>,
    term_tree: Arc<Mutex<Option<Value>>>,
    search_response: Arc<Mutex<Option<Value>>>,
}

/// Handle on a running fake T411 server.
pub struct FakeT411 {
    pub addr: String,
    state: FakeState,
}

impl FakeT411 {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn start() -> Self {
        let state = FakeState::default();

        let app = Router::new()
            .route("/auth", post(auth))
            .route("/categories/tree/", get(category_tree))
            .route("/terms/tree/", get(term_tree))
            .route("/torrents/search/", get(search))
            .route("/torrents/search/{expression}", get(search))
            .route("/broken", get(broken))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Client configuration pointing at this server.
    pub fn api_config(&self, username: &str, password: &str) -> ApiConfig {
        ApiConfig {
            username: username.to_string(),
            password: password.to_string(),
            url_scheme: "http".to_string(),
            host: self.addr.clone(),
            timeout_secs: 5,
        }
    }

    /// Requests received so far, `/auth` excluded.
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Replace the category tree (defaults to the fixture).
    pub fn set_category_tree(&self, tree: Value) {
        *self.state.category_tree.lock().unwrap() = Some(tree);
    }

    /// Replace the term tree (defaults to the fixture).
    pub fn set_term_tree(&self, tree: Value) {
        *self.state.term_tree.lock().unwrap() = Some(tree);
    }

    /// Replace the body served for searches (defaults to the fixture).
    pub fn set_search_response(&self, response: Value) {
        *self.state.search_response.lock().unwrap() = Some(response);
    }
}

fn record(state: &FakeState, uri: &Uri, headers: &HeaderMap) -> bool {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = authorization.as_deref() == Some(TOKEN);

    state.requests.lock().unwrap().push(ReceivedRequest {
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        authorization,
    });

    authorized
}

fn token_error() -> Json<Value> {
    Json(json!({"code": 202, "error": "Invalid token"}))
}

async fn auth(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);

    if username == Some(USERNAME) && password == Some(PASSWORD) {
        Json(json!({"uid": "98214", "token": TOKEN}))
    } else {
        Json(json!({"code": 107, "error": "Wrong password"}))
    }
}

async fn category_tree(State(state): State<FakeState>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    if !record(&state, &uri, &headers) {
        return token_error();
    }
    let configured = state.category_tree.lock().unwrap().clone();
    Json(configured.unwrap_or_else(fixtures::category_tree))
}

async fn term_tree(State(state): State<FakeState>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    if !record(&state, &uri, &headers) {
        return token_error();
    }
    let configured = state.term_tree.lock().unwrap().clone();
    Json(configured.unwrap_or_else(fixtures::term_tree))
}

async fn search(State(state): State<FakeState>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    if !record(&state, &uri, &headers) {
        return token_error();
    }
    let configured = state.search_response.lock().unwrap().clone();
    Json(configured.unwrap_or_else(fixtures::search_response))
}

async fn broken(State(state): State<FakeState>, uri: Uri, headers: HeaderMap) -> Response {
    record(&state, &uri, &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}
