//! Error responder. Turns every request failure into the JSON envelope:
//!
//! ```text
//! {"error": <kind>, "message": <message>, "details": {...}}
//! ```
//!
//! Failures are matched against an ordered rule table, top to bottom. The
//! application rule comes first, so a failure that is an [`ApplicationError`]
//! is always rendered as one; the catch-all comes last and never leaks the
//! internal failure text unless debug is on.
//!
//! Wiring: handlers return [`Failure`], which parks itself on the response;
//! [`normalize`] (installed with `axum::middleware::from_fn_with_state`)
//! logs it and renders the envelope with the configured debug policy.
//! [`panic_response`] feeds `CatchPanicLayer` so panics take the same path.

mod failure;

use std::any::Any;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

pub use failure::{APPLICATION_ERROR, ApplicationError, Failure};
use failure::PendingFailure;

pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Header the request-id layer sets; echoed into failure logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub details: Map<String, Value>,
}

// ── Rule table ────────────────────────────────────────────────────────────────

struct Rule {
    name: &'static str,
    matches: fn(&Failure) -> bool,
    render: fn(&Failure, bool) -> (StatusCode, ErrorBody),
}

const RULES: &[Rule] = &[
    Rule { name: "application", matches: Failure::is_application, render: render_application },
    Rule { name: "catch-all", matches: any_failure, render: render_internal },
];

fn any_failure(_: &Failure) -> bool {
    true
}

fn render_application(failure: &Failure, debug: bool) -> (StatusCode, ErrorBody) {
    match failure {
        Failure::Application(e) => (
            e.status(),
            ErrorBody {
                error: e.kind().to_string(),
                message: e.message().to_string(),
                details: e.details().clone(),
            },
        ),
        other => render_internal(other, debug),
    }
}

fn render_internal(failure: &Failure, debug: bool) -> (StatusCode, ErrorBody) {
    let mut details = Map::new();
    if debug {
        details.insert("error".to_string(), Value::String(failure.to_string()));
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody {
            error: INTERNAL_SERVER_ERROR.to_string(),
            message: INTERNAL_MESSAGE.to_string(),
            details,
        },
    )
}

/// First matching rule wins. Pure: no logging.
pub(crate) fn envelope(failure: &Failure, debug: bool) -> (StatusCode, ErrorBody) {
    RULES
        .iter()
        .find(|rule| (rule.matches)(failure))
        .map(|rule| (rule.render)(failure, debug))
        .unwrap_or_else(|| render_internal(failure, debug))
}

fn rule_name(failure: &Failure) -> &'static str {
    RULES
        .iter()
        .find(|rule| (rule.matches)(failure))
        .map_or("catch-all", |rule| rule.name)
}

// ── Responder ─────────────────────────────────────────────────────────────────

/// Stateless apart from the debug flag; cheap to copy into router state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Responder {
    debug: bool,
}

impl Responder {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Status and body for `failure` under this responder's debug policy.
    pub fn envelope(&self, failure: &Failure) -> (StatusCode, ErrorBody) {
        envelope(failure, self.debug)
    }

    /// Log `failure` and build the final response.
    pub fn respond(&self, failure: &Failure, request_id: Option<&str>) -> Response {
        let request_id = request_id.unwrap_or("-");
        let rule = rule_name(failure);
        match failure {
            Failure::Application(e) => {
                error!(
                    %request_id,
                    rule,
                    kind = %e.kind(),
                    status = e.status().as_u16(),
                    details = ?e.details(),
                    "{}: {}",
                    e.kind(),
                    e.message()
                );
            }
            Failure::Internal(cause) => {
                // `{:?}` on anyhow includes the cause chain and any captured backtrace.
                error!(%request_id, rule, error = ?cause, "unhandled failure: {cause}");
            }
        }

        let (status, body) = self.envelope(failure);
        (status, Json(body)).into_response()
    }
}

/// Middleware: re-render any parked [`Failure`] on the way out.
pub async fn normalize(
    State(responder): State<Responder>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<PendingFailure>() {
        Some(PendingFailure(failure)) => responder.respond(&failure, request_id.as_deref()),
        None => response,
    }
}

/// `CatchPanicLayer` hook: the panic becomes an internal [`Failure`].
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    Failure::from_panic(payload).into_response()
}
