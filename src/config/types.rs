//! Public configuration types consumed by the server and handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Deployment environment selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const CHOICES: &'static [&'static str] = &["development", "staging", "production"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Front-end collaborator selected by `FRAMEWORK`.
///
/// `nicegui` means a component UI owns the root URL and this service only
/// answers the placeholder and API routes; `fastapi` means pages are
/// rendered server-side from the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    NiceGui,
    FastApi,
}

impl Framework {
    pub const CHOICES: &'static [&'static str] = &["nicegui", "fastapi"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NiceGui => "nicegui",
            Self::FastApi => "fastapi",
        }
    }
}

impl FromStr for Framework {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nicegui" => Ok(Self::NiceGui),
            "fastapi" => Ok(Self::FastApi),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved value of a caller-declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Where a raw key/value pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Environment,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("env file"),
            Self::Environment => f.write_str("environment"),
        }
    }
}

/// Fully-resolved, validated service configuration.
///
/// Built once at startup and shared as `Arc<Config>`; there is no mutation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    /// Requests failure detail in error responses; see
    /// [`Config::exposes_failure_detail`].
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub framework: Framework,
    pub log_level: String,
    /// Directory searched for `index.html` (already expanded, no `~`).
    pub template_dir: PathBuf,
    /// Caller-declared options, keyed by their environment name.
    pub options: BTreeMap<String, OptionValue>,
}

impl Config {
    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether 500 bodies carry the failure text. Production never does,
    /// even with `DEBUG` on.
    pub fn exposes_failure_detail(&self) -> bool {
        self.debug && self.environment != Environment::Production
    }

    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// Bool option lookup; `None` if undeclared or not a bool.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.option(key).and_then(OptionValue::as_bool)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid value for {key}: '{value}' (expected {expected})")]
    Invalid {
        key: String,
        value: String,
        expected: String,
    },

    #[error("unknown key {key} in {origin} (strict mode)")]
    UnknownKey { key: String, origin: SourceKind },

    #[error("cannot read {}: {message}", path.display())]
    Source { path: PathBuf, message: String },
}

impl ConfigurationError {
    /// The offending key, when the failure is tied to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Invalid { key, .. } | Self::UnknownKey { key, .. } => Some(key),
            Self::Source { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(" staging ".parse::<Environment>(), Ok(Environment::Staging));
        assert!("prod".parse::<Environment>().is_err());
    }

    #[test]
    fn framework_round_trips_its_names() {
        for name in Framework::CHOICES {
            let fw: Framework = name.parse().unwrap();
            assert_eq!(fw.as_str(), *name);
        }
        assert!("django".parse::<Framework>().is_err());
    }

    #[test]
    fn production_never_exposes_failure_detail() {
        let mut config = Config::test_default();
        config.debug = true;
        for (env, exposed) in [
            (Environment::Development, true),
            (Environment::Staging, true),
            (Environment::Production, false),
        ] {
            config.environment = env;
            assert_eq!(config.exposes_failure_detail(), exposed, "{env}");
        }
        config.debug = false;
        config.environment = Environment::Development;
        assert!(!config.exposes_failure_detail());
    }

    #[test]
    fn option_value_accessors_are_type_strict() {
        assert_eq!(OptionValue::Bool(true).as_bool(), Some(true));
        assert_eq!(OptionValue::Bool(true).as_int(), None);
        assert_eq!(OptionValue::Int(7).as_int(), Some(7));
        assert_eq!(OptionValue::Str("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn invalid_error_names_key_and_value() {
        let e = ConfigurationError::Invalid {
            key: "PORT".into(),
            value: "99999".into(),
            expected: "integer in 1..=65535".into(),
        };
        assert_eq!(e.key(), Some("PORT"));
        assert!(e.to_string().contains("PORT"));
        assert!(e.to_string().contains("99999"));
    }

    #[test]
    fn source_error_shows_path() {
        let e = ConfigurationError::Source {
            path: PathBuf::from("/etc/folio/.env"),
            message: "permission denied".into(),
        };
        assert_eq!(e.key(), None);
        assert!(e.to_string().contains("/etc/folio/.env"));
    }
}
