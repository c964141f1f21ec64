#![allow(clippy::unwrap_used)]
// Integration tests for `DocumentStoreClient` and `RealtimeClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emberwatch_api::{DocumentStoreClient, Error, Fields, RealtimeClient, Value};

// ── Helpers ─────────────────────────────────────────────────────────

const COLLECTION_PATH: &str = "/v1/projects/demo/databases/(default)/documents/emergencies";

async fn setup() -> (MockServer, DocumentStoreClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    let client = DocumentStoreClient::with_client(
        reqwest::Client::new(),
        base_url,
        "demo".into(),
        SecretString::from("test-key".to_owned()),
    );
    (server, client)
}

fn doc_json(id: &str, kind: &str, status: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/emergencies/{id}"),
        "fields": {
            "latitude": { "doubleValue": 11.0168 },
            "longitude": { "doubleValue": 76.9558 },
            "type": { "stringValue": kind },
            "status": { "stringValue": status },
            "timestamp": { "timestampValue": "2024-06-15T10:30:00Z" }
        }
    })
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_documents_single_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [doc_json("a1", "Fire", "pending"), doc_json("b2", "Medical", "resolved")]
        })))
        .mount(&server)
        .await;

    let docs = client.list_documents("emergencies").await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id(), Some("a1"));
    assert_eq!(docs[1].field("status").unwrap().as_str(), Some("resolved"));
}

#[tokio::test]
async fn test_list_documents_empty_collection() {
    let (server, client) = setup().await;

    // An empty collection omits the `documents` key entirely.
    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let docs = client.list_documents("emergencies").await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_list_documents_follows_page_tokens() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .and(query_param("pageToken", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [doc_json("p2", "Patrol", "pending")]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [doc_json("p1", "Fire", "pending")],
            "nextPageToken": "next-1"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let docs = client.list_documents("emergencies").await.unwrap();
    let ids: Vec<_> = docs.iter().filter_map(|d| d.id()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_list_documents_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let result = client.list_documents("emergencies").await;
    assert!(
        matches!(result, Err(Error::DocumentStore { status: 403, .. })),
        "expected DocumentStore error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_documents_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_documents("emergencies").await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_document_returns_server_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(body_partial_json(json!({
            "fields": { "type": { "stringValue": "Patrol" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json("new-id", "Patrol", "pending")))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Fields::new();
    fields.insert("type".into(), Value::string("Patrol"));
    fields.insert("status".into(), Value::string("pending"));

    let doc = client.create_document("emergencies", fields).await.unwrap();
    assert_eq!(doc.id(), Some("new-id"));
}

#[tokio::test]
async fn test_create_document_without_name_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fields": {} })))
        .mount(&server)
        .await;

    let result = client.create_document("emergencies", Fields::new()).await;
    assert!(matches!(result, Err(Error::MissingDocumentName)));
}

#[tokio::test]
async fn test_patch_document_sends_update_mask() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{COLLECTION_PATH}/a1")))
        .and(query_param("updateMask.fieldPaths", "status"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_partial_json(json!({
            "fields": { "status": { "stringValue": "in-progress" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json("a1", "Fire", "in-progress")))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Fields::new();
    fields.insert("status".into(), Value::string("in-progress"));
    let doc = client
        .patch_document("emergencies", "a1", fields, &["status"])
        .await
        .unwrap();
    assert_eq!(doc.field("status").unwrap().as_str(), Some("in-progress"));
}

#[tokio::test]
async fn test_patch_missing_document_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{COLLECTION_PATH}/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = client
        .patch_document("emergencies", "gone", Fields::new(), &["status"])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_document() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{COLLECTION_PATH}/a1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_document("emergencies", "a1").await.unwrap();
}

// ── Realtime records ────────────────────────────────────────────────

#[tokio::test]
async fn test_realtime_record_present() {
    let server = MockServer::start().await;
    let client = RealtimeClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    );

    Mock::given(method("GET"))
        .and(path("/drone_status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lat": 11.02,
            "long": 76.95,
            "timestamp": 1_718_447_400_000_i64,
            "type": "fire"
        })))
        .mount(&server)
        .await;

    let record = client.get_record("drone_status").await.unwrap().unwrap();
    assert_eq!(record["type"], "fire");
}

#[tokio::test]
async fn test_realtime_record_absent() {
    let server = MockServer::start().await;
    let client = RealtimeClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    );

    Mock::given(method("GET"))
        .and(path("/drone_status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    assert!(client.get_record("drone_status").await.unwrap().is_none());
}

#[tokio::test]
async fn test_realtime_permission_denied() {
    let server = MockServer::start().await;
    let client = RealtimeClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Some(SecretString::from("token".to_owned())),
    );

    Mock::given(method("GET"))
        .and(path("/drone_status.json"))
        .and(query_param("auth", "token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Permission denied" })),
        )
        .mount(&server)
        .await;

    match client.get_record("drone_status").await {
        Err(Error::Realtime { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Permission denied");
        }
        other => panic!("expected Realtime error, got: {other:?}"),
    }
}
