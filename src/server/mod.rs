//! Axum HTTP server for the portfolio.
//!
//! ## URL layout
//!
//! ```text
//! GET  /                 → rendered template, or JSON placeholder
//! GET  /favicon.ico      → 204
//! GET  /api/health
//! GET  /api/portfolio
//! POST /api/contact
//! *                      → 404 NotFoundError via the responder
//! ```
//!
//! Layers, outermost first: request id, propagate request id, trace,
//! responder, catch-panic. The responder therefore sees the request id and
//! every failure, panics included.

pub mod api;
pub mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Request, StatusCode},
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::portfolio::Portfolio;
use crate::responder::{self, Responder};

pub use ui::{PLACEHOLDER_MESSAGE, TemplateSource};

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted and read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub portfolio: Arc<Portfolio>,
    /// `None` when `<TEMPLATE_DIR>/index.html` does not exist.
    pub template: Option<Arc<TemplateSource>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, template: Option<TemplateSource>) -> Self {
        Self {
            config,
            portfolio: Arc::new(Portfolio::sample()),
            template: template.map(Arc::new),
        }
    }
}

// ── Request ids ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    let responder = Responder::new(state.config.exposes_failure_detail());

    let routes = Router::new()
        .route("/", get(ui::root))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/api/health", get(api::health))
        .route("/api/portfolio", get(api::portfolio))
        .route("/api/contact", post(api::contact))
        .fallback(api::not_found)
        .method_not_allowed_fallback(api::method_not_allowed)
        .with_state(state);

    with_error_handling(routes, responder)
}

/// Wrap any router in the responder, panic capture, tracing and request-id
/// layers. Exposed so other route sets get the same failure contract.
pub fn with_error_handling(router: Router, responder: Responder) -> Router {
    router
        .layer(CatchPanicLayer::custom(responder::panic_response))
        .layer(middleware::from_fn_with_state(responder, responder::normalize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

// ── WebServer ─────────────────────────────────────────────────────────────────

pub struct WebServer {
    bind_addr: String,
    state: AppState,
}

impl WebServer {
    /// Resolve the template source and capture the shared state.
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        let template = TemplateSource::discover(&config.template_dir)?;
        match &template {
            Some(t) => info!(path = %t.path().display(), "template source found, serving html at /"),
            None => info!(
                dir = %config.template_dir.display(),
                "no template source, / serves the json placeholder"
            ),
        }

        Ok(Self {
            bind_addr: config.bind_addr(),
            state: AppState::new(config, template),
        })
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Serve until `shutdown` is cancelled, then drain in-flight requests.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let router = build_router(self.state);

        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| AppError::Server(format!("bind failed on {}: {e}", self.bind_addr)))?;

        info!(bind_addr = %self.bind_addr, "http server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

        info!("http server shut down");
        Ok(())
    }
}
