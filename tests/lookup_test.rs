use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use scribe::lookup::http::HttpLookup;
use scribe::lookup::{Lookup, LookupError, LookupRequest};
use scribe::navigator::Navigator;
use scribe::questions::StaticQuestions;
use scribe::session::{Session, SessionConfig, SessionError};
use scribe::step::Tool;
use scribe::store::sqlite::SqliteStore;

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    let action = body["action"].as_str().unwrap_or_default();
    let input = body["action_input"].as_str().unwrap_or_default();
    Json(json!({ "message": format!("{action} <- {input}") }))
}

async fn structured(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "message": { "id": "Q1581" } }))
}

async fn broken(Json(_body): Json<Value>) -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "tool crashed")
}

async fn not_json(Json(_body): Json<Value>) -> &'static str {
    "plain text"
}

async fn spawn_lookup_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/lookup", post(echo))
        .route("/structured", post(structured))
        .route("/broken", post(broken))
        .route("/not-json", post(not_json));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client(url: String) -> HttpLookup {
    HttpLookup::new(url, Duration::from_secs(5)).unwrap()
}

fn request(action: Tool, input: &str) -> LookupRequest {
    LookupRequest {
        action,
        action_input: input.to_string(),
    }
}

#[tokio::test]
async fn message_becomes_observation() {
    let base = spawn_lookup_server().await;
    let lookup = client(format!("{base}/lookup"));

    let observation = lookup
        .lookup(&request(Tool::GetLabel, "Q1581"))
        .await
        .unwrap();
    assert_eq!(observation, "getLabel <- Q1581");
}

#[tokio::test]
async fn structured_message_is_stringified() {
    let base = spawn_lookup_server().await;
    let lookup = client(format!("{base}/structured"));

    let observation = lookup
        .lookup(&request(Tool::GetWikidataId, "Missouri"))
        .await
        .unwrap();
    assert_eq!(observation, r#"{"id":"Q1581"}"#);
}

#[tokio::test]
async fn non_2xx_is_status_error() {
    let base = spawn_lookup_server().await;
    let lookup = client(format!("{base}/broken"));

    let err = lookup
        .lookup(&request(Tool::RunSparql, "SELECT"))
        .await
        .unwrap_err();
    match err {
        LookupError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "tool crashed");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn unknown_route_is_status_error() {
    let base = spawn_lookup_server().await;
    let lookup = client(format!("{base}/missing"));

    let err = lookup
        .lookup(&request(Tool::GetLabel, "Q1"))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Status { status: 404, .. }));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let base = spawn_lookup_server().await;
    let lookup = client(format!("{base}/not-json"));

    let err = lookup
        .lookup(&request(Tool::GetLabel, "Q1"))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Malformed(_)));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let lookup = client(format!("http://{addr}/lookup"));
    let err = lookup
        .lookup(&request(Tool::GetLabel, "Q1"))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Transport(_)));
}

#[tokio::test]
async fn session_sends_prefixed_input_over_http() {
    let base = spawn_lookup_server().await;
    let navigator = Navigator::with_static(StaticQuestions::new(vec![
        "Peter Quill... born in which U.S. state?".to_string(),
    ]))
    .unwrap();
    let mut session = Session::new(
        navigator,
        Arc::new(client(format!("{base}/lookup"))),
        Arc::new(SqliteStore::in_memory().unwrap()),
        SessionConfig::default(),
    );

    let form = session.form_mut();
    form.set_thought("Looking for birth state");
    form.set_action(Some(Tool::WikiSearch));
    form.set_action_input("Guardians of the Galaxy Quill");
    session.submit().await.unwrap();

    assert_eq!(
        session.trace().steps()[0].observation.as_deref(),
        Some("wikiSearch <- Peter Quill... born in which U.S. state?#Guardians of the Galaxy Quill")
    );
}

#[tokio::test]
async fn session_surfaces_http_failure() {
    let base = spawn_lookup_server().await;
    let navigator = Navigator::with_static(StaticQuestions::builtin()).unwrap();
    let mut session = Session::new(
        navigator,
        Arc::new(client(format!("{base}/broken"))),
        Arc::new(SqliteStore::in_memory().unwrap()),
        SessionConfig::default(),
    );

    let form = session.form_mut();
    form.set_thought("Looking for birth state");
    form.set_action(Some(Tool::GetLabel));
    form.set_action_input("Q1");

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, SessionError::Lookup(LookupError::Status { .. })));
    assert!(session.trace().is_empty());
}
