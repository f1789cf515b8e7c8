//! REST client tests against an in-process fake of the T411 API.

mod common;

use common::{fixtures, FakeT411, PASSWORD, TOKEN, USERNAME};

use t411_core::client::{
    AuthOutcome, ClientError, ClientQuery, Credentials, T411Api, T411RestClient, TermSelector,
};

#[tokio::test]
async fn test_authenticate_and_fetch_trees() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config(USERNAME, PASSWORD)).unwrap();

    let outcome = client.authenticate().await.unwrap();
    assert_eq!(outcome, AuthOutcome::Authenticated);
    assert!(client.is_authenticated().await);

    let categories = client.fetch_category_tree().await.unwrap();
    assert_eq!(categories, fixtures::category_tree());

    let terms = client.fetch_term_tree().await.unwrap();
    assert_eq!(terms, fixtures::term_tree());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path_and_query, "/categories/tree/");
    assert_eq!(requests[1].path_and_query, "/terms/tree/");
    for request in &requests {
        assert_eq!(request.authorization.as_deref(), Some(TOKEN));
    }
}

#[tokio::test]
async fn test_rejected_authentication() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config(USERNAME, "wrong")).unwrap();

    let outcome = client.authenticate().await.unwrap();
    assert_eq!(
        outcome,
        AuthOutcome::Rejected {
            code: Some(107),
            message: "Wrong password".to_string(),
        }
    );
    assert!(!client.is_authenticated().await);

    let result = client.fetch_category_tree().await;
    assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_set_credentials_then_authenticate() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config("", "")).unwrap();

    assert!(!client.authenticate().await.unwrap().is_authenticated());

    client
        .set_credentials(Credentials::new(USERNAME, PASSWORD))
        .await;
    assert!(client.authenticate().await.unwrap().is_authenticated());
}

#[tokio::test]
async fn test_search_request_encoding() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config(USERNAME, PASSWORD)).unwrap();
    client.authenticate().await.unwrap();

    let query = ClientQuery {
        expression: Some("sintel 2010".to_string()),
        category_id: Some(631),
        result_per_page: Some(10),
        page_index: Some(0),
        terms: vec![
            TermSelector {
                term_id: 17,
                term_type_id: 7,
            },
            TermSelector {
                term_id: 16,
                term_type_id: 9,
            },
        ],
    };

    let response = client.search(&query).await.unwrap();
    assert_eq!(response, fixtures::search_response());

    let requests = server.requests();
    assert_eq!(
        requests[0].path_and_query,
        "/torrents/search/sintel%202010?cat=631&limit=10&offset=0&term%5B7%5D%5B%5D=17&term%5B9%5D%5B%5D=16"
    );
}

#[tokio::test]
async fn test_search_without_parameters() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config(USERNAME, PASSWORD)).unwrap();
    client.authenticate().await.unwrap();

    let query = ClientQuery {
        expression: Some("sintel".to_string()),
        ..Default::default()
    };
    client.search(&query).await.unwrap();

    assert_eq!(server.requests()[0].path_and_query, "/torrents/search/sintel");
}

#[tokio::test]
async fn test_http_error_status() {
    let server = FakeT411::start().await;
    let client = T411RestClient::new(&server.api_config(USERNAME, PASSWORD)).unwrap();
    client.authenticate().await.unwrap();

    let result = client.fetch_json("/broken").await;
    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    let mut config = FakeT411::start().await.api_config(USERNAME, PASSWORD);
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    config.host = closed.local_addr().unwrap().to_string();
    drop(closed);
    let client = T411RestClient::new(&config).unwrap();

    let result = client.authenticate().await;
    assert!(matches!(result, Err(ClientError::ConnectionFailed(_))));
}
