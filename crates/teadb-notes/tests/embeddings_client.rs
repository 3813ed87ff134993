//! Wire-level tests for the embeddings client.

use serde_json::json;
use teadb_core::RetryPolicy;
use teadb_notes::{EmbeddingsClient, NotesError};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> EmbeddingsClient {
    let retry = RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 0,
    };
    EmbeddingsClient::new("sk-test", "text-embedding-3-small", retry)
        .expect("client should build")
        .with_base_url(&server.uri())
}

fn inputs() -> Vec<String> {
    vec![
        "Sencha. green tea.".to_string(),
        "Assam. black tea.".to_string(),
    ]
}

#[tokio::test]
async fn returns_vectors_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": ["Sencha. green tea.", "Assam. black tea."]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "index": 1, "embedding": [0.5, 0.25] },
                { "index": 0, "embedding": [0.125, -1.0] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = client(&server).embed(&inputs()).await.unwrap();
    assert_eq!(vectors, vec![vec![0.125, -1.0], vec![0.5, 0.25]]);
}

#[tokio::test]
async fn empty_input_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client(&server).embed(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn short_response_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.1] }]
        })))
        .mount(&server)
        .await;

    let err = client(&server).embed(&inputs()).await.unwrap_err();
    assert!(matches!(err, NotesError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "index": 0, "embedding": [1.0] },
                { "index": 1, "embedding": [2.0] }
            ]
        })))
        .mount(&server)
        .await;

    let vectors = client(&server).embed(&inputs()).await.unwrap();
    assert_eq!(vectors.len(), 2);
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).embed(&inputs()).await.unwrap_err();
    assert!(matches!(err, NotesError::Api { status: 401, .. }), "got {err:?}");
}

#[tokio::test]
async fn rate_limit_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server).embed(&inputs()).await.unwrap_err();
    assert!(matches!(err, NotesError::RateLimited { .. }));
}
