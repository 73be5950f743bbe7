//! Entry endpoint and the template source behind it.
//!
//! `GET /` renders `<TEMPLATE_DIR>/index.html` when it exists; otherwise it
//! answers with the JSON placeholder, because a component front end owns
//! the root URL in that setup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use super::AppState;
use crate::portfolio::{escape_html, render_sections};

pub const PLACEHOLDER_MESSAGE: &str =
    "This endpoint is not used when NiceGUI is active. Access the root URL directly.";

/// `index.html` read once at startup.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    path: PathBuf,
    index: String,
}

impl TemplateSource {
    pub const INDEX: &'static str = "index.html";

    /// `Ok(None)` if `dir/index.html` does not exist.
    pub fn discover(dir: &Path) -> io::Result<Option<Self>> {
        let path = dir.join(Self::INDEX);
        match fs::read_to_string(&path) {
            Ok(index) => Ok(Some(Self { path, index })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn from_string(index: impl Into<String>) -> Self {
        Self { path: PathBuf::from(Self::INDEX), index: index.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace `{{ key }}` placeholders with values from `ctx`. Values are
    /// inserted verbatim; unknown placeholders are left in place.
    pub fn render(&self, ctx: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.index.len());
        let mut rest = self.index.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = after[..end].trim();
            match ctx.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// GET /
pub(super) async fn root(State(state): State<AppState>) -> Response {
    let Some(template) = state.template.as_deref() else {
        return Json(json!({ "message": PLACEHOLDER_MESSAGE })).into_response();
    };

    let config = &state.config;
    let app_name = escape_html(&config.app_name);
    let app_version = escape_html(&config.app_version);
    let sections = render_sections(&state.portfolio);
    let page = template.render(&[
        ("app_name", app_name.as_str()),
        ("app_version", app_version.as_str()),
        ("environment", config.environment.as_str()),
        ("portfolio", sections.as_str()),
    ]);
    Html(page).into_response()
}
