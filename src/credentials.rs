//! Credentials file loading
//!
//! Reads the `.env`-style `KEY=VALUE` file the verification run authenticates
//! with. Loading is a fail-fast precondition: the run never starts with a
//! missing file or incomplete credentials.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const KEY_API_KEY: &str = "VNTANA_API_KEY";
pub const KEY_EMAIL: &str = "VNTANA_EMAIL";
pub const KEY_PASSWORD: &str = "VNTANA_PASSWORD";
pub const KEY_ORGANIZATION_UUID: &str = "VNTANA_ORGANIZATION_UUID";
pub const KEY_BASE_URL: &str = "VNTANA_API_BASE_URL";

/// Required keys, in the order they are reported when missing.
pub const REQUIRED_KEYS: [&str; 3] = [KEY_API_KEY, KEY_EMAIL, KEY_PASSWORD];

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read credentials file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing required credentials: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("{key} is not a valid UUID: '{value}'")]
    InvalidUuid { key: &'static str, value: String },
}

/// Credentials for one verification run. Loaded once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub email: String,
    pub password: String,
    /// Organization to request a refresh token for. When absent, the run
    /// falls back to the first organization discovered from the listing.
    pub organization_uuid: Option<Uuid>,
    /// Custom API base URL for staging/test environments.
    pub base_url: Option<String>,
}

impl Credentials {
    /// Load and validate credentials from a `KEY=VALUE` file.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        if !path.exists() {
            return Err(CredentialsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| CredentialsError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_vars(&parse_env_file(&content))
    }

    /// Build credentials from already-parsed variables, reporting all missing
    /// required keys in one error. Empty values count as missing.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, CredentialsError> {
        let get = |key: &str| vars.get(key).filter(|value| !value.is_empty());

        let missing: Vec<String> = REQUIRED_KEYS
            .into_iter()
            .filter(|key| get(key).is_none())
            .map(String::from)
            .collect();

        if !missing.is_empty() {
            return Err(CredentialsError::MissingKeys(missing));
        }

        let organization_uuid = match get(KEY_ORGANIZATION_UUID) {
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| CredentialsError::InvalidUuid {
                key: KEY_ORGANIZATION_UUID,
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            api_key: vars[KEY_API_KEY].clone(),
            email: vars[KEY_EMAIL].clone(),
            password: vars[KEY_PASSWORD].clone(),
            organization_uuid,
            base_url: get(KEY_BASE_URL).cloned(),
        })
    }
}

/// Parse `KEY=VALUE` lines into a map.
///
/// Blank lines, `#` comment lines, and lines without `=` are ignored.
/// Surrounding single/double quotes are stripped from values. Later
/// occurrences of a key win.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches('\'').trim_matches('"');
        vars.insert(key.to_string(), value.to_string());
    }

    vars
}
