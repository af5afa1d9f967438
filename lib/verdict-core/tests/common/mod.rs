#![allow(dead_code, clippy::missing_errors_doc)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::Json;
use axum::Router;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use http::Method;
use rstest::fixture;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::info;

use verdict_core::{ApiClient, Decoder, Operation, SchemaTable};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub status: u16,
}

/// Operations served by [`router`].
pub fn schema() -> anyhow::Result<SchemaTable> {
    let table = SchemaTable::builder()
        .operation(
            Operation::builder("getUser", Method::GET, "/users/{id}")
                .response(200, "application/json", Decoder::json::<User>())
                .response(404, "application/problem+json", Decoder::json::<Problem>()),
        )
        .operation(
            Operation::builder("createUser", Method::POST, "/users")
                .response(201, "application/json", Decoder::json::<User>())
                .response(400, "text/plain", Decoder::text()),
        )
        .operation(Operation::builder("deleteUser", Method::DELETE, "/users/{id}").no_content(204))
        .operation(
            Operation::builder("echo", Method::GET, "/echo/{segment}")
                .response(200, "application/json", Decoder::any()),
        )
        .operation(
            Operation::builder("slow", Method::GET, "/slow")
                .response(200, "text/plain", Decoder::text()),
        )
        .build()?;
    Ok(table)
}

async fn get_user(Path(id): Path<u32>) -> Response {
    match id {
        1 => Json(json!({ "id": 1, "name": "Alice" })).into_response(),
        // valid JSON, wrong shape
        2 => Json(json!({ "id": "two" })).into_response(),
        // malformed JSON
        3 => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"bad": json}"#,
        )
            .into_response(),
        4 => (
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>maintenance</body></html>",
        )
            .into_response(),
        5 => (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/problem+json")],
            json!({ "title": "Not Found", "status": 404 }).to_string(),
        )
            .into_response(),
    }
}

async fn create_user(Json(body): Json<Value>) -> Response {
    match body.get("name").and_then(Value::as_str) {
        Some(name) => (
            StatusCode::CREATED,
            Json(json!({ "id": 100, "name": name })),
        )
            .into_response(),
        None => (StatusCode::BAD_REQUEST, "missing name").into_response(),
    }
}

async fn delete_user(Path(_id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn echo(
    Path(segment): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Value> {
    let headers = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-") || name.as_str() == "authorization")
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect::<serde_json::Map<_, _>>();
    Json(json!({
        "segment": segment,
        "query": query,
        "headers": headers,
    }))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "done"
}

pub fn router() -> Router {
    Router::new()
        .route("/api/users", axum::routing::post(create_user))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .route("/api/echo/{segment}", get(echo))
        .route("/api/slow", get(slow))
}

/// A running server and a client calling it.
#[derive(Debug)]
pub struct TestApp {
    pub client: ApiClient,
    pub addr: SocketAddr,
    server: JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind listener")?;
        let addr = listener.local_addr()?;
        info!(%addr, "launching server");
        let server = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router()).await {
                tracing::error!(%error, "server failed");
            }
        });

        let client = ApiClient::builder()
            .with_port(addr.port())
            .with_base_path("/api")?
            .with_schema(schema()?)
            .build()?;

        Ok(Self {
            client,
            addr,
            server,
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[fixture]
pub async fn app() -> TestApp {
    init_tracing();
    match TestApp::start().await {
        Ok(app) => app,
        Err(error) => {
            panic!("fail to start test app: {error:?}");
        }
    }
}
