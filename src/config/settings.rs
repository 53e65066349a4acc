//! TOML-based configuration for schemascope.
//!
//! Supports a config file (schemascope.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connection]
//! url = "https://contoso.crm.dynamics.com"
//! api_path = "/api/data/v9.2"
//! token = "${DATAVERSE_TOKEN}"
//! timeout_seconds = 30
//!
//! [loader]
//! single_flight = true
//!
//! [diagram]
//! system_columns_path = "./system_columns.toml"
//!
//! [links]
//! maker_portal_url = "https://make.powerapps.com"
//! solution_id = "fd140aaf-4df4-11dd-bd17-0019b9312238"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::protocol::{API_BASE_PATH, DEFAULT_TIMEOUT_SECS};
use crate::diagram::{DenyListError, SystemColumnDenyList};
use crate::links::{DEFAULT_MAKER_PORTAL_URL, DEFAULT_SOLUTION_ID};
use crate::loader::{FlightPolicy, LoaderOptions};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCHEMASCOPE_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("No organization URL configured")]
    MissingUrl,

    #[error("Invalid organization URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    DenyList(#[from] DenyListError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Web API connection.
    pub connection: ConnectionSettings,

    /// Loader behaviour.
    pub loader: LoaderSettings,

    /// Diagram generation.
    pub diagram: DiagramSettings,

    /// Deep links.
    pub links: LinkSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Organization URL (supports ${ENV_VAR} expansion).
    pub url: String,

    /// API base path under the organization URL.
    pub api_path: String,

    /// Bearer token (supports ${ENV_VAR} expansion).
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_path: API_BASE_PATH.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionSettings {
    /// Get the organization URL with environment variables expanded,
    /// validated, and without a trailing slash.
    pub fn resolved_url(&self) -> Result<String, SettingsError> {
        let expanded = expand_env_vars(self.url.trim())?;
        if expanded.is_empty() {
            return Err(SettingsError::MissingUrl);
        }

        url::Url::parse(&expanded).map_err(|source| SettingsError::InvalidUrl {
            url: expanded.clone(),
            source,
        })?;

        Ok(expanded.trim_end_matches('/').to_string())
    }

    /// Get the token with environment variables expanded.
    pub fn resolved_token(&self) -> Result<Option<String>, SettingsError> {
        match &self.token {
            Some(token) => {
                let expanded = expand_env_vars(token)?;
                Ok((!expanded.is_empty()).then_some(expanded))
            }
            None => Ok(None),
        }
    }
}

/// Loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Collapse concurrent column and relationship loads of the same table.
    pub single_flight: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            single_flight: true,
        }
    }
}

impl LoaderSettings {
    /// Convert to loader options.
    pub fn to_options(&self) -> LoaderOptions {
        LoaderOptions {
            flight_policy: if self.single_flight {
                FlightPolicy::SingleFlight
            } else {
                FlightPolicy::Unguarded
            },
        }
    }
}

/// Diagram configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagramSettings {
    /// Replacement for the embedded system column list.
    pub system_columns_path: Option<String>,
}

impl DiagramSettings {
    /// Load the configured deny-list, or the embedded one.
    pub fn deny_list(&self) -> Result<SystemColumnDenyList, SettingsError> {
        match &self.system_columns_path {
            Some(path) => {
                let expanded = expand_env_vars(path)?;
                Ok(SystemColumnDenyList::from_file(expanded)?)
            }
            None => Ok(SystemColumnDenyList::builtin().clone()),
        }
    }
}

/// Deep link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkSettings {
    pub maker_portal_url: String,
    pub solution_id: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            maker_portal_url: DEFAULT_MAKER_PORTAL_URL.to_string(),
            solution_id: DEFAULT_SOLUTION_ID.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMASCOPE_CONFIG`
    /// 2. `./schemascope.toml`
    /// 3. `~/.config/schemascope/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        match Self::discover() {
            Some(path) => Self::from_file(path),
            None => Ok(Settings::default()),
        }
    }

    /// Path of the config file `load` would read, if any.
    pub fn discover() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        let local_config = PathBuf::from("schemascope.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("schemascope").join("config.toml"))
            .filter(|path| path.exists())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
