//! Integration tests for the records API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use privasee_gateway::{create_router, GatewayConfig, GatewayState};
use privasee_identity::{DirectoryUser, StaticDirectory};
use privasee_store::{MemoryTable, TableRecordStore};

/// Helper to create a server over an in-memory table.
fn test_server() -> (Arc<MemoryTable>, TestServer) {
    let table = Arc::new(MemoryTable::new());
    let store = Arc::new(TableRecordStore::new(table.clone()));
    let directory = Arc::new(StaticDirectory::new(vec![
        DirectoryUser::new("auth0|alice", "alice@x.com"),
        DirectoryUser::new("auth0|bob", "bob@x.com"),
    ]));

    let state = GatewayState::new(store, directory, GatewayConfig::default());
    let server = TestServer::new(create_router(state)).unwrap();
    (table, server)
}

async fn create(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/records").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn root_and_health() {
    let (_, server) = test_server();

    let root = server.get("/").await;
    root.assert_status_ok();
    assert!(root.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("running"));

    let health = server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn create_assigns_sequential_ids_and_defaults() {
    let (_, server) = test_server();

    let first = create(
        &server,
        json!({"question": "Do you have a DPO?", "createdBy": "alice@x.com", "_recordId": 500}),
    )
    .await;
    let second = create(&server, json!({"question": "Q2", "createdBy": "alice@x.com"})).await;

    assert_eq!(first["_recordId"], 1);
    assert_eq!(second["_recordId"], 2);
    assert_eq!(first["companyName"], "Test Company");
    assert_eq!(first["_companyId"], 0);
    assert_eq!(first["updatedBy"], "alice@x.com");
    assert_eq!(first["createdAt"], first["updatedAt"]);
    assert_eq!(first["properties"], "");
}

#[tokio::test]
async fn create_requires_question() {
    let (table, server) = test_server();

    let response = server
        .post("/api/records")
        .json(&json!({"question": "  ", "createdBy": "alice@x.com"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "bad_request");
    assert!(table.is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (_, server) = test_server();

    let response = server
        .post("/api/records")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{\"question\": "))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_returns_created_record() {
    let (_, server) = test_server();
    let created = create(
        &server,
        json!({
            "question": "Is data encrypted?",
            "createdBy": "alice@x.com",
            "properties": [{"key": "a", "value": "1"}, {"key": "b", "value": "2"}]
        }),
    )
    .await;

    let response = server.get("/api/records/1").await;
    response.assert_status_ok();
    let fetched = response.json::<Value>();
    assert_eq!(fetched, created);
    assert_eq!(fetched["properties"], "a:1,b:2");
}

#[tokio::test]
async fn invalid_and_missing_ids() {
    let (_, server) = test_server();

    server
        .get("/api/records/abc")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/records/0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/api/records/42").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn update_keeps_immutable_fields() {
    let (_, server) = test_server();
    let created = create(&server, json!({"question": "Old", "createdBy": "alice@x.com"})).await;

    let response = server
        .put("/api/records/1")
        .json(&json!({
            "question": "X",
            "_recordId": 77,
            "createdBy": "mallory@x.com",
            "createdAt": "2000-01-01T00:00:00Z",
            "updatedBy": "bob@x.com",
            "properties": "k:v"
        }))
        .await;
    response.assert_status_ok();

    let fetched = server.get("/api/records/1").await.json::<Value>();
    assert_eq!(fetched["question"], "X");
    assert_eq!(fetched["_recordId"], 1);
    assert_eq!(fetched["createdBy"], "alice@x.com");
    assert_eq!(fetched["createdAt"], created["createdAt"]);
    assert_eq!(fetched["updatedBy"], "bob@x.com");
    assert_eq!(fetched["properties"], "k:v");
}

#[tokio::test]
async fn patch_with_empty_assignee_unassigns() {
    let (_, server) = test_server();
    create(
        &server,
        json!({"question": "Q", "createdBy": "a@x.com", "assignedTo": "bob@x.com"}),
    )
    .await;

    let response = server
        .patch("/api/records/1")
        .json(&json!({"assignedTo": ""}))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Value>().get("assignedTo").is_none());
}

#[tokio::test]
async fn update_rejects_blank_question() {
    let (_, server) = test_server();
    create(&server, json!({"question": "Q", "createdBy": "a@x.com"})).await;

    server
        .patch("/api/records/1")
        .json(&json!({"question": ""}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (_, server) = test_server();
    create(&server, json!({"question": "Q", "createdBy": "a@x.com"})).await;

    server
        .delete("/api/records/1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/api/records/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/records/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters() {
    let (_, server) = test_server();
    create(
        &server,
        json!({"question": "GDPR basics", "createdBy": "admin@x.com", "assignedTo": "alice@x.com"}),
    )
    .await;
    create(
        &server,
        json!({"question": "Retention policy", "createdBy": "admin@x.com", "assignedTo": "bob@x.com"}),
    )
    .await;

    let ids = |response: axum_test::TestResponse| -> Vec<u64> {
        response
            .json::<Vec<Value>>()
            .iter()
            .map(|r| r["_recordId"].as_u64().unwrap())
            .collect()
    };

    assert_eq!(ids(server.get("/api/records").await), vec![2, 1]);
    assert_eq!(
        ids(server.get("/api/records").add_query_param("search", "gdpr").await),
        vec![1]
    );
    assert_eq!(
        ids(server
            .get("/api/records")
            .add_query_param("assignedTo", "bob@x.com")
            .await),
        vec![2]
    );
    assert!(ids(server
        .get("/api/records")
        .add_query_param("search", "policy")
        .add_query_param("assignedTo", "alice@x.com")
        .await)
    .is_empty());
    assert_eq!(
        ids(server
            .get("/api/records")
            .add_query_param("assignedTo", "alice@x.com,bob@x.com")
            .await),
        vec![2, 1]
    );
}

#[tokio::test]
async fn list_accepts_repeated_assignees_and_keeps_search_whitespace() {
    let (_, server) = test_server();
    create(
        &server,
        json!({"question": "GDPR basics", "createdBy": "admin@x.com", "assignedTo": "alice@x.com"}),
    )
    .await;
    create(
        &server,
        json!({"question": "Retention policy", "createdBy": "admin@x.com", "assignedTo": "bob@x.com"}),
    )
    .await;
    create(&server, json!({"question": "Unassigned", "createdBy": "admin@x.com"})).await;

    let response = server
        .get("/api/records?assignedTo=alice@x.com&assignedTo=bob@x.com")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    let response = server
        .get("/api/records?search=nothing&searchQuery=gdpr")
        .await;
    response.assert_status_ok();
    let records = response.json::<Vec<Value>>();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["question"], "GDPR basics");

    let response = server
        .get("/api/records")
        .add_query_param("search", "policy ")
        .await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn search_input_cannot_break_the_filter() {
    let (_, server) = test_server();
    create(&server, json!({"question": "Q", "createdBy": "a@x.com"})).await;

    let response = server
        .get("/api/records")
        .add_query_param("search", "\"), TRUE(), (\"")
        .await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn bulk_assign_skips_missing_ids() {
    let (_, server) = test_server();
    create(&server, json!({"question": "A", "createdBy": "admin@x.com"})).await;
    create(
        &server,
        json!({"question": "B", "createdBy": "admin@x.com", "assignedTo": "bob@x.com"}),
    )
    .await;

    let response = server
        .post("/api/records/bulk/assign")
        .json(&json!({
            "recordIds": [1, 99999],
            "assignedTo": "carol@x.com",
            "updatedBy": "admin@x.com"
        }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"assigned": [1]}));

    let a = server.get("/api/records/1").await.json::<Value>();
    assert_eq!(a["assignedTo"], "carol@x.com");
    assert_eq!(a["updatedBy"], "admin@x.com");

    let b = server.get("/api/records/2").await.json::<Value>();
    assert_eq!(b["assignedTo"], "bob@x.com");
}

#[tokio::test]
async fn bulk_assign_validation() {
    let (_, server) = test_server();
    create(&server, json!({"question": "A", "createdBy": "admin@x.com"})).await;

    for body in [
        json!({"recordIds": [], "assignedTo": "carol@x.com", "updatedBy": "admin@x.com"}),
        json!({"recordIds": [1], "assignedTo": " ", "updatedBy": "admin@x.com"}),
        json!({"recordIds": [1], "assignedTo": "carol@x.com"}),
        json!({"recordIds": ["x"], "assignedTo": "carol@x.com", "updatedBy": "admin@x.com"}),
    ] {
        server
            .post("/api/records/bulk/assign")
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn bulk_assign_without_matches_is_internal_error() {
    let (_, server) = test_server();

    let response = server
        .post("/api/records/bulk/assign")
        .json(&json!({"recordIds": [99999], "assignedTo": "carol@x.com", "updatedBy": "admin@x.com"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["message"], "Failed to bulk assign records");
    assert!(body["error"]["details"].is_string());
}

#[tokio::test]
async fn store_outage_is_internal_error() {
    let (table, server) = test_server();
    table.set_offline(true);

    let response = server
        .post("/api/records")
        .json(&json!({"question": "Q", "createdBy": "a@x.com"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Failed to create record"
    );

    server
        .get("/api/records")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    table.set_offline(false);
    let record = create(&server, json!({"question": "Q", "createdBy": "a@x.com"})).await;
    assert_eq!(record["_recordId"], 1);
}

#[tokio::test]
async fn users_are_listed() {
    let (_, server) = test_server();

    let response = server.get("/api/users").await;
    response.assert_status_ok();
    let users = response.json::<Vec<Value>>();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["user_id"], "auth0|alice");
    assert_eq!(users[1]["email"], "bob@x.com");
}
