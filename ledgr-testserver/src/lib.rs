use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const PATH_SUPPLY: &str = "/v2/ledger/supply";
pub const PATH_COMPILE: &str = "/v2/teal/compile";
pub const PATH_MALFORMED: &str = "/v2/malformed";

pub const TOKEN_HEADER: &str = "x-algo-api-token";

/// Supply body served by [`PATH_SUPPLY`]; both amounts exceed `2^53 - 1`.
pub const SUPPLY_BODY: &str =
    r#"{"current_round":4021,"online-money":18446744073709551615,"total-money":10000000000000000000}"#;

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    rejected_token: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_rejected_token(&self) {
        self.rejected_token.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn rejected_token(&self) -> u64 {
        self.rejected_token.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct AppState {
    stats: TestServerStats,
    token: Option<Arc<str>>,
}

impl AppState {
    // `None` when the request may proceed.
    fn check_token(&self, headers: &HeaderMap) -> Option<Response> {
        let expected = self.token.as_deref()?;
        let given = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if given == Some(expected) {
            return None;
        }
        self.stats.inc_rejected_token();
        Some(json_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid API Token"}"#.to_string(),
        ))
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn handle_supply(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.stats.inc_requests_total();
    if let Some(rejected) = state.check_token(&headers) {
        return rejected;
    }
    json_response(StatusCode::OK, SUPPLY_BODY.to_string())
}

// Echoes what the node would need to compile: the payload, its content type and the
// sourcemap flag.
async fn handle_compile(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.stats.inc_requests_total();
    if let Some(rejected) = state.check_token(&headers) {
        return rejected;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let res = serde_json::json!({
        "hash": format!("LEN{}", body.len()),
        "result": String::from_utf8_lossy(&body),
        "content-type": content_type,
        "sourcemap": query.get("sourcemap"),
    });

    match serde_json::to_string(&res) {
        Ok(text) => json_response(StatusCode::OK, text),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "encode error").into_response(),
    }
}

async fn handle_malformed(State(state): State<AppState>) -> Response {
    state.stats.inc_requests_total();
    json_response(StatusCode::OK, r#"{"current_round": 1"#.to_string())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(PATH_SUPPLY, get(handle_supply))
        .route(PATH_COMPILE, post(handle_compile))
        .route(PATH_MALFORMED, get(handle_malformed))
        .with_state(state)
}

pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_inner(None).await
    }

    /// Like [`TestServer::start`], but every route answers 401 unless [`TOKEN_HEADER`] matches.
    pub async fn start_with_token(token: &str) -> std::io::Result<Self> {
        Self::start_inner(Some(Arc::from(token))).await
    }

    async fn start_inner(token: Option<Arc<str>>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(AppState {
            stats: stats.clone(),
            token,
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            base_url: format!("http://{addr}"),
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
