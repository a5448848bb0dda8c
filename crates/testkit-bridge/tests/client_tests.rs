//! Integration tests for the RPC client against an in-process stub server.
//!
//! The stub speaks the test-server wire protocol: one POST endpoint per
//! method name, arguments in the query string, JSON or raw response
//! bodies. Each test drives the real client over loopback.

use axum::extract::{Query, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testkit_bridge::{Args, BridgeError, Client, Value};

/// Queries received by the `release` endpoint, in arrival order.
type ReleaseLog = Arc<Mutex<Vec<String>>>;

async fn handle_database_create(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    // Mirrors the real test servers: the `name` argument is a quoted
    // string token.
    match params.get("name").map(String::as_str) {
        Some("\"\"") => {
            (StatusCode::BAD_REQUEST, "name should not be empty").into_response()
        }
        Some(name) if name.len() > 255 => {
            (StatusCode::BAD_REQUEST, "File name too long").into_response()
        }
        Some(_) => Json(json!({"_ref": "db-1"})).into_response(),
        None => (StatusCode::BAD_REQUEST, "a name parameter is null").into_response(),
    }
}

async fn handle_get_document(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("id").map(String::as_str) == Some("null") {
        return (StatusCode::BAD_REQUEST, "a documentID parameter is null").into_response();
    }
    Json(json!({"_ref": "doc-7"})).into_response()
}

async fn handle_echo_query(RawQuery(query): RawQuery) -> impl IntoResponse {
    Json(json!({"query": query.unwrap_or_default()}))
}

async fn handle_echo_body(
    headers: axum::http::HeaderMap,
    body: String,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != "application/json" {
        return (StatusCode::BAD_REQUEST, "expected a JSON body").into_response();
    }
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    Json(json!({"received": parsed})).into_response()
}

async fn handle_raw() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], "hello")
}

async fn handle_json_map() -> impl IntoResponse {
    Json(json!({"x": 1}))
}

async fn handle_bad_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn handle_empty() -> StatusCode {
    StatusCode::OK
}

async fn handle_slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

async fn handle_release(State(log): State<ReleaseLog>, RawQuery(query): RawQuery) -> StatusCode {
    log.lock().unwrap().push(query.unwrap_or_default());
    StatusCode::OK
}

/// Start the stub server on an ephemeral port.
async fn start_stub() -> (SocketAddr, ReleaseLog) {
    let log: ReleaseLog = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/database_create", post(handle_database_create))
        .route("/database_getDocument", post(handle_get_document))
        .route("/echo_query", post(handle_echo_query))
        .route("/echo_body", post(handle_echo_body))
        .route("/raw_greeting", post(handle_raw))
        .route("/json_map", post(handle_json_map))
        .route("/bad_json", post(handle_bad_json))
        .route("/no_result", post(handle_empty))
        .route("/slow", post(handle_slow))
        .route("/release", post(handle_release))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server error");
    });

    (addr, log)
}

async fn connect() -> (Client, ReleaseLog) {
    let (addr, log) = start_stub().await;
    let client = Client::new(&format!("http://{}", addr)).expect("client should build");
    (client, log)
}

#[tokio::test]
async fn test_constructing_call_returns_handle() {
    let (client, _) = connect().await;

    let mut args = Args::new();
    args.set_string("name", "foo");
    let result = client.invoke("database_create", &args).await.unwrap();

    let handle = result.into_pointer().unwrap();
    assert_eq!(handle.token(), "db-1");
}

#[tokio::test]
async fn test_remote_error_surfaces_status_and_message() {
    let (client, _) = connect().await;

    let mut args = Args::new();
    args.set_string("database", "db-1").set_null("id");
    let err = client
        .invoke("database_getDocument", &args)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("a documentID parameter is null"));
}

#[tokio::test]
async fn test_200_never_raises_invocation_error() {
    let (client, _) = connect().await;

    // The raw body "hello" is not meaningful data, but the call succeeded;
    // it decodes through the raw path as an opaque token.
    let result = client.invoke("raw_greeting", &Args::new()).await.unwrap();
    assert_eq!(result.as_pointer().unwrap().token(), "hello");
}

#[tokio::test]
async fn test_json_content_type_decodes_as_mapping() {
    let (client, _) = connect().await;

    let result = client.invoke("json_map", &Args::new()).await.unwrap();
    let Value::Dict(dict) = result else {
        panic!("expected dict, got {:?}", result);
    };
    assert_eq!(dict["x"], Value::Int(1));
}

#[tokio::test]
async fn test_empty_body_decodes_as_null() {
    let (client, _) = connect().await;

    let result = client.invoke("no_result", &Args::new()).await.unwrap();
    assert!(result.is_null());
}

#[tokio::test]
async fn test_query_preserves_caller_order_and_encoding() {
    let (client, _) = connect().await;

    let mut args = Args::new();
    args.set_int("a", 1).set_int("b", 2).set_string("c", "x");
    let result = client.invoke("echo_query", &args).await.unwrap();

    let Value::Dict(dict) = result else {
        panic!("expected dict");
    };
    assert_eq!(dict["query"].as_str().unwrap(), "a=I1&b=I2&c=%22x%22");
}

#[tokio::test]
async fn test_handle_round_trips_unmodified_through_query() {
    let (client, _) = connect().await;

    let mut args = Args::new();
    args.set_string("name", "foo");
    let db = client
        .invoke("database_create", &args)
        .await
        .unwrap()
        .into_pointer()
        .unwrap();

    let mut args = Args::new();
    args.set_handle("database", &db);
    let result = client.invoke("echo_query", &args).await.unwrap();

    let Value::Dict(dict) = result else {
        panic!("expected dict");
    };
    assert_eq!(dict["query"].as_str().unwrap(), "database=db-1");
}

#[tokio::test]
async fn test_body_is_posted_as_json() {
    let (client, _) = connect().await;

    let payload = json!({"documents": {"doc_1": {"type": "user"}}});
    let result = client
        .invoke_with_body("echo_body", &Args::new(), &payload)
        .await
        .unwrap();

    let Value::Dict(dict) = result else {
        panic!("expected dict");
    };
    let Value::Dict(received) = &dict["received"] else {
        panic!("expected nested dict");
    };
    assert!(received.contains_key("documents"));
}

#[tokio::test]
async fn test_release_issues_one_invocation_per_call() {
    let (client, log) = connect().await;

    let mut args = Args::new();
    args.set_string("name", "foo");
    let db = client
        .invoke("database_create", &args)
        .await
        .unwrap()
        .into_pointer()
        .unwrap();

    client.release(&db).await.unwrap();
    client.release(&db).await.unwrap();

    let queries = log.lock().unwrap();
    assert_eq!(queries.as_slice(), ["object=db-1", "object=db-1"]);
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(&format!("http://{}", addr)).unwrap();
    let err = client.invoke("database_create", &Args::new()).await.unwrap_err();

    assert!(
        matches!(err, BridgeError::Transport { .. }),
        "expected transport error, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let (addr, _) = start_stub().await;
    let client =
        Client::with_timeout(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();

    let err = client.invoke("slow", &Args::new()).await.unwrap_err();
    assert!(
        matches!(err, BridgeError::Timeout(_)),
        "expected timeout, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_decoding_error_is_distinct_from_invocation_error() {
    let (client, _) = connect().await;

    // 400 from the server: invocation error.
    let mut args = Args::new();
    args.set_string("name", "");
    let err = client.invoke("database_create", &args).await.unwrap_err();
    assert!(err.is_invocation());
    assert!(!err.is_decoding());
    assert!(err.to_string().contains("name should not be empty"));

    // Over-long name: also an invocation error, message passed through.
    let mut args = Args::new();
    args.set_string("name", "x".repeat(1028));
    let err = client.invoke("database_create", &args).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("File name too long"));

    // 200 with an unparseable JSON body: decoding error, not invocation.
    let err = client.invoke("bad_json", &Args::new()).await.unwrap_err();
    assert!(err.is_decoding());
    assert!(!err.is_invocation());
    assert!(err.to_string().contains("{not json"));
}
