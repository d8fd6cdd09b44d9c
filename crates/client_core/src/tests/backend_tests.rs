use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    received: Arc<Mutex<Vec<MessageRequest>>>,
    clears: Arc<Mutex<u32>>,
}

async fn handle_message(
    State(state): State<ServerState>,
    Json(payload): Json<MessageRequest>,
) -> Json<Value> {
    let reply = format!("You said: {}", payload.message);
    state.received.lock().await.push(payload);
    Json(json!({
        "success": true,
        "message": reply,
        "slots": [
            {"start": "2024-03-08T11:00:00Z", "end": "2024-03-08T13:00:00Z", "description": "today"}
        ]
    }))
}

async fn handle_clear(State(state): State<ServerState>) -> &'static str {
    *state.clears.lock().await += 1;
    "cleared"
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_assistant_server() -> (String, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/message", post(handle_message))
        .route("/api/clear-history", get(handle_clear))
        .with_state(state.clone());
    (spawn_server(app).await, state)
}

#[test]
fn endpoints_join_onto_base_url() {
    let backend = HttpAssistantBackend::new("http://localhost:5001/").expect("backend");
    assert_eq!(
        backend.message_url().as_str(),
        "http://localhost:5001/api/message"
    );
    assert_eq!(
        backend.clear_history_url().as_str(),
        "http://localhost:5001/api/clear-history"
    );

    let prefixed = HttpAssistantBackend::new("http://localhost:5001/chat").expect("backend");
    assert_eq!(
        prefixed.message_url().as_str(),
        "http://localhost:5001/chat/api/message"
    );
}

#[test]
fn rejects_unparseable_base_url() {
    let err = HttpAssistantBackend::new("not a url")
        .err()
        .expect("must fail");
    assert!(matches!(err, BackendError::InvalidUrl(_)));
}

#[tokio::test]
async fn posts_message_and_decodes_envelope() {
    let (base_url, state) = spawn_assistant_server().await;
    let backend = HttpAssistantBackend::new(&base_url).expect("backend");

    let envelope = backend
        .post_message(&MessageRequest::new("Give me the available slots for today"))
        .await
        .expect("post");

    assert!(envelope.success);
    assert_eq!(
        envelope.message_text(),
        Some("You said: Give me the available slots for today")
    );
    assert_eq!(envelope.slots.as_ref().map(Vec::len), Some(1));
    assert_eq!(
        state.received.lock().await.as_slice(),
        &[MessageRequest::new("Give me the available slots for today")]
    );
}

#[tokio::test]
async fn clear_history_ignores_body() {
    let (base_url, state) = spawn_assistant_server().await;
    let backend = HttpAssistantBackend::new(&base_url).expect("backend");

    backend.clear_history().await.expect("clear");
    assert_eq!(*state.clears.lock().await, 1);
}

#[tokio::test]
async fn http_errors_surface_status() {
    let app = Router::new()
        .route(
            "/api/message",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/api/clear-history",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
    let base_url = spawn_server(app).await;
    let backend = HttpAssistantBackend::new(&base_url).expect("backend");

    let err = backend
        .post_message(&MessageRequest::new("hi"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, BackendError::Status { status: 500 }));

    let err = backend.clear_history().await.expect_err("must fail");
    assert!(matches!(err, BackendError::Status { status: 503 }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let app = Router::new().route("/api/message", post(|| async { "<html>oops</html>" }));
    let base_url = spawn_server(app).await;
    let backend = HttpAssistantBackend::new(&base_url).expect("backend");

    let err = backend
        .post_message(&MessageRequest::new("hi"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let backend = HttpAssistantBackend::new(&format!("http://{addr}")).expect("backend");
    let err = backend.clear_history().await.expect_err("must fail");
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn missing_backend_always_fails() {
    let err = MissingAssistantBackend
        .post_message(&MessageRequest::new("hi"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, BackendError::Unavailable(_)));
}
