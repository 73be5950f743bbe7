//! Request-scoped failure types.
//!
//! Handlers return `Result<_, Failure>`. A [`Failure`] is either an
//! [`ApplicationError`] raised on purpose, with its own status and details,
//! or an unclassified internal fault.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// Category name used when none is given.
pub const APPLICATION_ERROR: &str = "ApplicationError";

/// An expected, classifiable failure. Its `kind` is echoed verbatim as the
/// `error` field of the response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationError {
    kind: String,
    message: String,
    status: StatusCode,
    details: Map<String, Value>,
}

impl ApplicationError {
    /// Status 500, kind `ApplicationError`, no details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: APPLICATION_ERROR.to_string(),
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            details: Map::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_kind("NotFoundError")
            .with_status(StatusCode::NOT_FOUND)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_kind("ValidationError")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_kind("PermissionDeniedError")
            .with_status(StatusCode::FORBIDDEN)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_kind("BadRequestError")
            .with_status(StatusCode::BAD_REQUEST)
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApplicationError {}

/// Anything that ends a request early.
#[derive(Debug)]
pub enum Failure {
    Application(ApplicationError),
    Internal(anyhow::Error),
}

impl Failure {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(err))
    }

    /// Wrap a caught panic payload as an internal failure.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Internal(anyhow::anyhow!("handler panicked: {msg}"))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application(e) => fmt::Display::fmt(e, f),
            Self::Internal(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<ApplicationError> for Failure {
    fn from(e: ApplicationError) -> Self {
        Self::Application(e)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Self::internal(e)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(e)
    }
}

/// Failure parked on a response until [`super::normalize`] renders it with
/// the configured debug policy.
#[derive(Clone, Debug)]
pub(crate) struct PendingFailure(pub Arc<Failure>);

impl IntoResponse for Failure {
    /// Renders the non-debug envelope and parks the failure in the response
    /// extensions for the responder middleware to log and re-render.
    fn into_response(self) -> Response {
        let (status, body) = super::envelope(&self, false);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(PendingFailure(Arc::new(self)));
        response
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}
