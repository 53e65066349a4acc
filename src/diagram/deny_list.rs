//! Versioned list of system column names hidden from diagrams.
//!
//! Example file:
//! ```toml
//! version = 1
//! columns = ["createdby", "createdon", "ownerid"]
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

/// Embedded default list.
const DEFAULT_DENY_LIST: &str = include_str!("system_columns.toml");

static DEFAULT: LazyLock<SystemColumnDenyList> = LazyLock::new(|| {
    SystemColumnDenyList::from_toml(DEFAULT_DENY_LIST).expect("embedded deny-list is valid")
});

/// Error type for deny-list loading.
#[derive(Debug, thiserror::Error)]
pub enum DenyListError {
    #[error("Deny-list file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read deny-list file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse deny-list: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unsupported deny-list version: {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Deserialize)]
struct DenyListFile {
    version: u32,
    #[serde(default)]
    columns: Vec<String>,
}

/// Set of lowercase column logical names treated as system noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemColumnDenyList {
    version: u32,
    columns: BTreeSet<String>,
}

impl SystemColumnDenyList {
    /// Highest file version this build understands.
    pub const SUPPORTED_VERSION: u32 = 1;

    /// The embedded default list.
    pub fn builtin() -> &'static Self {
        &DEFAULT
    }

    /// Parse a list from TOML text. Names are lowercased.
    pub fn from_toml(content: &str) -> Result<Self, DenyListError> {
        let file: DenyListFile = toml::from_str(content)?;
        if file.version == 0 || file.version > Self::SUPPORTED_VERSION {
            return Err(DenyListError::UnsupportedVersion(file.version));
        }

        Ok(Self {
            version: file.version,
            columns: file
                .columns
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        })
    }

    /// Load a list from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DenyListError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DenyListError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build a list from names directly.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            version: Self::SUPPORTED_VERSION,
            columns: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Check a lowercase logical name.
    pub fn contains(&self, lowercase_name: &str) -> bool {
        self.columns.contains(lowercase_name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl Default for SystemColumnDenyList {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
