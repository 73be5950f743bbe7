//! Typed validation over the layered sources.
//!
//! Precedence is `declared default < env file < process environment`. The
//! whole table is validated before a [`Config`] is built, so a partially
//! valid configuration is never observable.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use super::source::{self, Layered};
use super::types::{Config, ConfigurationError, Environment, Framework, OptionValue, SourceKind};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Env-file path override. Only read from the process environment.
pub const ENV_FILE_KEY: &str = "ENV_FILE";
/// Enables strict mode when truthy in either source.
pub const STRICT_KEY: &str = "CONFIG_STRICT";
/// Feature flag for `POST /api/contact`.
pub const CONTACT_FORM_ENABLED: &str = "CONTACT_FORM_ENABLED";

/// Environment keys with these prefixes are ours; strict mode rejects
/// unknown ones. Anything else in the process environment is ignored.
const STRICT_PREFIXES: &[&str] = &["APP_", "CONFIG_"];

const PORT_RANGE: RangeInclusive<i64> = 1..=65535;

/// Static type of a declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Str,
    Bool,
    Int(RangeInclusive<i64>),
    OneOf(&'static [&'static str]),
}

/// A caller-declared option: key, type, and the default used when neither
/// source defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    key: String,
    kind: OptionKind,
    default: OptionValue,
}

impl OptionSpec {
    pub fn string(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self { key: key.into(), kind: OptionKind::Str, default: OptionValue::Str(default.into()) }
    }

    pub fn bool(key: impl Into<String>, default: bool) -> Self {
        Self { key: key.into(), kind: OptionKind::Bool, default: OptionValue::Bool(default) }
    }

    pub fn int(key: impl Into<String>, default: i64, range: RangeInclusive<i64>) -> Self {
        Self { key: key.into(), kind: OptionKind::Int(range), default: OptionValue::Int(default) }
    }

    /// Closed enum; stored lowercased as [`OptionValue::Str`].
    pub fn one_of(
        key: impl Into<String>,
        choices: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key: key.into(),
            kind: OptionKind::OneOf(choices),
            default: OptionValue::Str(default.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }
}

/// Keys every service config understands.
const BUILTIN_KEYS: &[&str] = &[
    "APP_NAME",
    "APP_VERSION",
    "APP_ENV",
    "DEBUG",
    "HOST",
    "PORT",
    "FRAMEWORK",
    "LOG_LEVEL",
    "TEMPLATE_DIR",
    ENV_FILE_KEY,
    STRICT_KEY,
];

/// Explicit loader. Tests build one with injected maps instead of mutating
/// the process environment.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    env_file: Option<PathBuf>,
    env: HashMap<String, String>,
    strict: bool,
    declared: Vec<OptionSpec>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader over the real process environment and its `ENV_FILE`
    /// (default `./.env`), with the service's own options declared.
    pub fn from_process_env() -> Self {
        // Non-UTF-8 variables cannot be any of our keys.
        let env: HashMap<String, String> = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        let env_file = env
            .get(ENV_FILE_KEY)
            .map(|p| expand_home(p))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));

        Self::new()
            .env_file(env_file)
            .env(env)
            .declare(OptionSpec::bool(CONTACT_FORM_ENABLED, true))
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Declare an additional option. Redeclaring a key replaces the earlier spec.
    pub fn declare(mut self, spec: OptionSpec) -> Self {
        self.declared.retain(|s| s.key != spec.key);
        self.declared.push(spec);
        self
    }

    pub fn load(&self) -> Result<Config, ConfigurationError> {
        let mut layered = Layered::default();
        if let Some(path) = &self.env_file {
            layered.overlay(SourceKind::File, source::read_env_file(path)?);
        }
        layered.overlay(
            SourceKind::Environment,
            self.env.iter().map(|(k, v)| (k.clone(), v.clone())),
        );

        let r = Resolver { layered: &layered };

        let strict = self.strict || r.boolean(STRICT_KEY, false)?;
        if strict {
            self.reject_unknown(&layered)?;
        }

        let port = r.int("PORT", 8000, PORT_RANGE)?;
        let template_dir = r.string("TEMPLATE_DIR", "templates");

        let mut options = BTreeMap::new();
        for spec in &self.declared {
            options.insert(spec.key.clone(), r.declared(spec)?);
        }

        let config = Config {
            app_name: r.string("APP_NAME", "ML Engineer Portfolio"),
            app_version: r.string("APP_VERSION", "1.0.0"),
            environment: r.parsed("APP_ENV", Environment::Development, Environment::CHOICES)?,
            debug: r.boolean("DEBUG", false)?,
            host: r.string("HOST", "0.0.0.0"),
            port: u16::try_from(port).map_err(|_| invalid("PORT", &port.to_string(), "port"))?,
            framework: r.parsed("FRAMEWORK", Framework::NiceGui, Framework::CHOICES)?,
            log_level: r.log_filter("LOG_LEVEL", "info")?,
            template_dir: expand_home(&template_dir),
            options,
        };

        debug!(strict, declared = self.declared.len(), "configuration validated");
        Ok(config)
    }

    fn is_known(&self, key: &str) -> bool {
        BUILTIN_KEYS.contains(&key) || self.declared.iter().any(|s| s.key == key)
    }

    fn reject_unknown(&self, layered: &Layered) -> Result<(), ConfigurationError> {
        for (key, raw) in layered.sorted() {
            if self.is_known(key) {
                continue;
            }
            let ours = match raw.origin {
                SourceKind::File => true,
                SourceKind::Environment => STRICT_PREFIXES.iter().any(|p| key.starts_with(p)),
            };
            if ours {
                return Err(ConfigurationError::UnknownKey {
                    key: key.to_string(),
                    origin: raw.origin,
                });
            }
        }
        Ok(())
    }
}

/// Load from the process environment and `ENV_FILE` (default `./.env`).
pub fn load() -> Result<Config, ConfigurationError> {
    Loader::from_process_env().load()
}

/// Load with an explicit env file and environment map.
pub fn load_from(
    env_file: Option<&Path>,
    env: HashMap<String, String>,
) -> Result<Config, ConfigurationError> {
    let mut loader = Loader::new()
        .env(env)
        .declare(OptionSpec::bool(CONTACT_FORM_ENABLED, true));
    if let Some(path) = env_file {
        loader = loader.env_file(path);
    }
    loader.load()
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── Typed resolution ──────────────────────────────────────────────────────────

struct Resolver<'a> {
    layered: &'a Layered,
}

impl Resolver<'_> {
    fn raw(&self, key: &str) -> Option<&str> {
        self.layered.get(key).map(|r| r.value.as_str())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }

    fn boolean(&self, key: &str, default: bool) -> Result<bool, ConfigurationError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => parse_bool(v).ok_or_else(|| invalid(key, v, "boolean")),
        }
    }

    fn int(
        &self,
        key: &str,
        default: i64,
        range: RangeInclusive<i64>,
    ) -> Result<i64, ConfigurationError> {
        let Some(v) = self.raw(key) else {
            return Ok(default);
        };
        let expected = || format!("integer in {}..={}", range.start(), range.end());
        match v.trim().parse::<i64>() {
            Ok(n) if range.contains(&n) => Ok(n),
            _ => Err(invalid(key, v, &expected())),
        }
    }

    /// A bare level (`debug`, `WARN`, `0`..`5`) or a directive list such
    /// as `folio_server=debug,tower_http=info`.
    fn log_filter(&self, key: &str, default: &str) -> Result<String, ConfigurationError> {
        let Some(v) = self.raw(key) else {
            return Ok(default.to_string());
        };
        let v = v.trim();
        let valid = if v.contains('=') || v.contains(',') {
            EnvFilter::try_new(v).is_ok()
        } else {
            v.parse::<LevelFilter>().is_ok()
        };
        if valid {
            Ok(v.to_string())
        } else {
            Err(invalid(key, v, "log level or tracing filter directives"))
        }
    }

    fn parsed<T: FromStr>(
        &self,
        key: &str,
        default: T,
        choices: &[&str],
    ) -> Result<T, ConfigurationError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => v
                .parse::<T>()
                .map_err(|_| invalid(key, v, &format!("one of {}", choices.join("|")))),
        }
    }

    fn declared(&self, spec: &OptionSpec) -> Result<OptionValue, ConfigurationError> {
        let Some(v) = self.raw(&spec.key) else {
            return Ok(spec.default.clone());
        };
        match &spec.kind {
            OptionKind::Str => Ok(OptionValue::Str(v.to_string())),
            OptionKind::Bool => parse_bool(v)
                .map(OptionValue::Bool)
                .ok_or_else(|| invalid(&spec.key, v, "boolean")),
            OptionKind::Int(range) => {
                let n = self.int(&spec.key, 0, range.clone())?;
                Ok(OptionValue::Int(n))
            }
            OptionKind::OneOf(choices) => {
                let lowered = v.trim().to_ascii_lowercase();
                if choices.contains(&lowered.as_str()) {
                    Ok(OptionValue::Str(lowered))
                } else {
                    Err(invalid(&spec.key, v, &format!("one of {}", choices.join("|"))))
                }
            }
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> ConfigurationError {
    ConfigurationError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}
