use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use thesis_chat_agent::{
    AgentBackend, AgentConfig, AgentError, FALLBACK_REPLY, HttpAgentClient, Identity, RunRequest,
    extract_reply,
};

#[derive(Clone, Default)]
struct Recorded {
    sessions: Arc<Mutex<Vec<(String, String, String, Value)>>>,
    runs: Arc<Mutex<Vec<Value>>>,
}

async fn create_session(
    State(recorded): State<Recorded>,
    Path((app, user, session)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    recorded
        .sessions
        .lock()
        .unwrap()
        .push((app.clone(), user, session, body));

    if app == "missing-app" {
        return (StatusCode::NOT_FOUND, "no such app").into_response();
    }

    Json(json!({ "id": "ignored" })).into_response()
}

async fn run(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    recorded.runs.lock().unwrap().push(body.clone());

    let text = body["newMessage"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    match text.as_str() {
        "explode" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "html" => "<html>proxy error</html>".into_response(),
        "tool" => Json(json!([
            { "content": { "role": "model", "parts": [{ "functionCall": { "name": "chatpdf" } }] } },
            { "content": { "role": "user", "parts": [{ "functionResponse": { "name": "chatpdf", "response": { "result": "Chapter 2 covers methodology." } } }] } }
        ]))
        .into_response(),
        "nothing" => Json(json!([{}])).into_response(),
        other => Json(json!([
            { "content": { "role": "model", "parts": [{ "text": format!("echo: {other}") }] } }
        ]))
        .into_response(),
    }
}

async fn spawn_server() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/apps/:app/users/:user/sessions/:session",
            post(create_session),
        )
        .route("/run", post(run))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}"), recorded)
}

fn client(base_url: &str, app_name: &str) -> HttpAgentClient {
    HttpAgentClient::new(AgentConfig::new(base_url, app_name)).unwrap()
}

#[tokio::test]
async fn create_session_posts_start_timestamp_to_identity_path() {
    let (base_url, recorded) = spawn_server().await;
    let client = client(&base_url, "pdfchat");
    let identity = Identity::new("u_tester", "s_first");

    client.create_session(&identity).await.unwrap();

    let sessions = recorded.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    let (app, user, session, body) = &sessions[0];
    assert_eq!(app, "pdfchat");
    assert_eq!(user, "u_tester");
    assert_eq!(session, "s_first");
    let started_at = body["state"]["started_at"].as_str().unwrap();
    assert!(started_at.ends_with('Z'));
    assert!(chrono_like(started_at));
}

fn chrono_like(value: &str) -> bool {
    // YYYY-MM-DDTHH:MM:SS.mmmZ
    value.len() == 24 && value.as_bytes()[10] == b'T' && value.as_bytes()[19] == b'.'
}

#[tokio::test]
async fn create_session_error_status_is_reported() {
    let (base_url, _) = spawn_server().await;
    let client = client(&base_url, "missing-app");

    let error = client
        .create_session(&Identity::new("u_a", "s_b"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AgentError::ResponseStatus { status: 404, .. }
    ));
    assert_eq!(error.stage(), "create-session-status");
}

#[tokio::test]
async fn run_sends_envelope_and_extracts_text_reply() {
    let (base_url, recorded) = spawn_server().await;
    let client = client(&base_url, "pdfchat");
    let identity = Identity::new("u_tester", "s_first");

    let turns = client
        .run(RunRequest::new("pdfchat", &identity, "hello"))
        .await
        .unwrap();

    assert_eq!(extract_reply(&turns), "echo: hello");
    let runs = recorded.runs.lock().unwrap();
    assert_eq!(
        runs[0],
        json!({
            "appName": "pdfchat",
            "userId": "u_tester",
            "sessionId": "s_first",
            "newMessage": { "role": "user", "parts": [{ "text": "hello" }] }
        })
    );
}

#[tokio::test]
async fn run_extracts_function_result_and_fallback() {
    let (base_url, _) = spawn_server().await;
    let client = client(&base_url, "pdfchat");
    let identity = Identity::new("u_tester", "s_first");

    let turns = client
        .run(RunRequest::new("pdfchat", &identity, "tool"))
        .await
        .unwrap();
    assert_eq!(extract_reply(&turns), "Chapter 2 covers methodology.");

    let turns = client
        .run(RunRequest::new("pdfchat", &identity, "nothing"))
        .await
        .unwrap();
    assert_eq!(extract_reply(&turns), FALLBACK_REPLY);
}

#[tokio::test]
async fn run_failures_surface_as_errors() {
    let (base_url, _) = spawn_server().await;
    let client = client(&base_url, "pdfchat");
    let identity = Identity::new("u_tester", "s_first");

    let status_error = client
        .run(RunRequest::new("pdfchat", &identity, "explode"))
        .await
        .unwrap_err();
    assert!(matches!(
        status_error,
        AgentError::ResponseStatus { status: 500, .. }
    ));

    let decode_error = client
        .run(RunRequest::new("pdfchat", &identity, "html"))
        .await
        .unwrap_err();
    assert!(matches!(decode_error, AgentError::DecodeResponse { .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_send_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{address}"), "pdfchat");
    let error = client
        .run(RunRequest::new(
            "pdfchat",
            &Identity::new("u_a", "s_b"),
            "hello",
        ))
        .await
        .unwrap_err();

    assert!(matches!(error, AgentError::SendRequest { .. }));
    assert_eq!(error.stage(), "send-run");
}
