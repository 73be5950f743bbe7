//! Raw key/value sources: the optional `.env`-style file and the process
//! environment, layered with the environment on top.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::types::{ConfigurationError, SourceKind};

/// A raw value and the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawValue {
    pub value: String,
    pub origin: SourceKind,
}

/// Merged view over all sources. Later layers replace earlier ones key by key.
#[derive(Debug, Default)]
pub(crate) struct Layered {
    entries: HashMap<String, RawValue>,
}

impl Layered {
    pub fn overlay<I>(&mut self, origin: SourceKind, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in pairs {
            self.entries.insert(key, RawValue { value, origin });
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    /// Entries sorted by key, so validation errors are deterministic.
    pub fn sorted(&self) -> Vec<(&str, &RawValue)> {
        let mut all: Vec<_> = self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }
}

/// Read `KEY=value` lines from `path` without touching the process
/// environment. A missing file yields no entries.
///
/// The file goes through dotenvy first. If dotenvy rejects a line, the file
/// is re-read line by line and a rejected `KEY=value` line keeps its raw,
/// trimmed value, so `APP_NAME=ML Engineer Portfolio` loads unquoted.
pub(crate) fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigurationError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "env file not present, skipping");
            return Ok(Vec::new());
        }
        Err(e) => return Err(source_error(path, e)),
    };

    let pairs = match dotenvy::from_read_iter(content.as_bytes()).collect::<Result<Vec<_>, _>>() {
        Ok(pairs) => pairs,
        Err(dotenvy::Error::LineParse(..)) => {
            debug!(path = %path.display(), "env file needs lenient parsing");
            parse_lines(path, &content)?
        }
        Err(e) => return Err(source_error(path, e)),
    };

    debug!(path = %path.display(), entries = pairs.len(), "env file read");
    Ok(pairs)
}

fn parse_lines(path: &Path, content: &str) -> Result<Vec<(String, String)>, ConfigurationError> {
    let mut pairs = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match dotenvy::from_read_iter(line.as_bytes()).next() {
            Some(Ok(pair)) => pairs.push(pair),
            None => {}
            Some(Err(_)) => {
                let pair = raw_pair(line).ok_or_else(|| ConfigurationError::Source {
                    path: path.to_path_buf(),
                    message: format!("line {}: expected KEY=value", index + 1),
                })?;
                pairs.push(pair);
            }
        }
    }
    Ok(pairs)
}

/// `KEY=rest of line`, with an optional `export ` prefix.
fn raw_pair(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let key_ok = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    key_ok.then(|| (key.to_string(), value.trim().to_string()))
}

fn source_error(path: &Path, e: impl std::fmt::Display) -> ConfigurationError {
    ConfigurationError::Source { path: path.to_path_buf(), message: e.to_string() }
}
