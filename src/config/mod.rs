//! Service configuration: environment variables over an optional `.env` file.
//!
//! # Module layout
//!
//! - **types**: `Config` and its enums, `OptionValue`, `ConfigurationError`.
//! - **source**: raw key/value sources (`dotenvy` file reader, layering).
//! - **load**: typed validation, strict mode, declared options, `load`,
//!   `load_from`, `expand_home`.
//!
//! `Config` is built once in `main` and handed around as `Arc<Config>`.

mod load;
mod source;
mod types;

pub use load::{
    expand_home, load, load_from, Loader, OptionKind, OptionSpec, CONTACT_FORM_ENABLED,
    DEFAULT_ENV_FILE, ENV_FILE_KEY, STRICT_KEY,
};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Defaults plus the service's declared options; no file or env reads.
    pub fn test_default() -> Self {
        Self {
            app_name: "ML Engineer Portfolio".into(),
            app_version: "1.0.0".into(),
            environment: Environment::Development,
            debug: false,
            host: "127.0.0.1".into(),
            port: 8000,
            framework: Framework::NiceGui,
            log_level: "info".into(),
            template_dir: std::path::PathBuf::from("templates"),
            options: std::collections::BTreeMap::from([(
                CONTACT_FORM_ENABLED.to_string(),
                OptionValue::Bool(true),
            )]),
        }
    }
}
