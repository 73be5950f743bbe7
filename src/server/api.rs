//! Axum handlers for `/api/*` routes and the router fallbacks.
//!
//! Handlers return `Result<_, Failure>`; the responder middleware turns the
//! error side into the JSON envelope.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, Uri},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

use super::AppState;
use crate::config::CONTACT_FORM_ENABLED;
use crate::responder::{ApplicationError, Failure};

const MAX_NAME: usize = 100;
const MAX_EMAIL: usize = 254;
const MAX_SUBJECT: usize = 200;
const MAX_MESSAGE: usize = 5000;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Collects every field problem, so the client can fix them in one go.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let mut problems = Map::new();

        check_text(&mut problems, "name", &self.name, true, MAX_NAME);
        check_text(&mut problems, "email", &self.email, true, MAX_EMAIL);
        check_text(&mut problems, "subject", &self.subject, false, MAX_SUBJECT);
        check_text(&mut problems, "message", &self.message, true, MAX_MESSAGE);

        if !problems.contains_key("email") && !looks_like_email(self.email.trim()) {
            problems.insert("email".into(), "must be a valid email address".into());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::validation("contact form failed validation").with_details(problems))
        }
    }
}

/// What gets logged about a submission: sizes only, no personal data.
#[derive(Debug, PartialEq, Eq)]
pub struct ContactSummary {
    pub name_chars: usize,
    pub email_domain_chars: usize,
    pub subject_chars: usize,
    pub message_chars: usize,
}

impl ContactForm {
    pub fn summary(&self) -> ContactSummary {
        let email = self.email.trim();
        ContactSummary {
            name_chars: self.name.trim().chars().count(),
            email_domain_chars: email.split_once('@').map_or(0, |(_, d)| d.chars().count()),
            subject_chars: self.subject.trim().chars().count(),
            message_chars: self.message.chars().count(),
        }
    }
}

fn check_text(problems: &mut Map<String, Value>, field: &str, value: &str, required: bool, max: usize) {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        problems.insert(field.into(), "must not be blank".into());
    } else if trimmed.chars().count() > max {
        problems.insert(field.into(), format!("must be at most {max} characters").into());
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "ok",
        "app_name": config.app_name,
        "app_version": config.app_version,
        "environment": config.environment.as_str(),
        "framework": config.framework.as_str(),
    }))
}

/// GET /api/portfolio
pub(super) async fn portfolio(State(state): State<AppState>) -> Result<Json<Value>, Failure> {
    Ok(Json(serde_json::to_value(&*state.portfolio)?))
}

/// POST /api/contact
pub(super) async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if !state.config.flag(CONTACT_FORM_ENABLED).unwrap_or(true) {
        return Err(ApplicationError::not_found("contact form is disabled").into());
    }

    // Every unreadable body is a 400, whatever status axum would pick.
    let Json(form) = payload.map_err(|rejection| {
        ApplicationError::bad_request("request body is not a valid contact form")
            .with_detail("reason", rejection.body_text())
    })?;

    form.validate()?;

    let received_at = chrono::Utc::now().to_rfc3339();
    info!(summary = ?form.summary(), %received_at, "contact form received");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "received", "received_at": received_at })),
    ))
}

/// Router fallback for unmatched paths.
pub(super) async fn not_found(uri: Uri) -> Failure {
    ApplicationError::not_found(format!("no route for {}", uri.path()))
        .with_detail("path", uri.path())
        .into()
}

/// Path matched but the method did not.
pub(super) async fn method_not_allowed(method: Method, uri: Uri) -> Failure {
    ApplicationError::new(format!("{method} is not allowed on {}", uri.path()))
        .with_kind("MethodNotAllowedError")
        .with_status(StatusCode::METHOD_NOT_ALLOWED)
        .with_detail("method", method.as_str())
        .into()
}
