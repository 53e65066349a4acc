//! Session-lifetime metadata cache.
//!
//! Holds everything fetched during one session so that revisiting a table
//! never hits the network twice.
//!
//! # Design
//!
//! - Explicitly owned; the loader receives it as `Arc<MetadataCache>`
//! - Keys are logical names exactly as fetched (case-sensitive)
//! - No TTL, no invalidation; dropped with its owner
//!
//! # Key Format
//!
//! ```text
//! columns        {table}            -> [Column, ...]
//! relationships  {table}            -> [Relationship, ...]
//! choices        ({table}, {column}) -> [ChoiceOption, ...]
//! ```

use dashmap::DashMap;

use crate::metadata::{ChoiceOption, Column, Relationship};

/// Key of a choice option set: (table logical name, column logical name).
pub type ChoiceKey = (String, String);

/// In-memory metadata cache.
#[derive(Debug, Default)]
pub struct MetadataCache {
    columns: DashMap<String, Vec<Column>>,
    relationships: DashMap<String, Vec<Relationship>>,
    choices: DashMap<ChoiceKey, Vec<ChoiceOption>>,
}

impl MetadataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Cached columns of a table.
    pub fn columns(&self, table: &str) -> Option<Vec<Column>> {
        self.columns.get(table).map(|entry| entry.value().clone())
    }

    /// Store the columns of a table.
    pub fn set_columns(&self, table: &str, columns: Vec<Column>) {
        self.columns.insert(table.to_string(), columns);
    }

    /// Check if the columns of a table are cached.
    pub fn has_columns(&self, table: &str) -> bool {
        self.columns.contains_key(table)
    }

    /// Apply `f` to the cached column `column` of `table`, if present.
    pub fn update_column<F>(&self, table: &str, column: &str, f: F) -> bool
    where
        F: FnOnce(&mut Column),
    {
        let Some(mut columns) = self.columns.get_mut(table) else {
            return false;
        };
        match columns.iter_mut().find(|c| c.logical_name == column) {
            Some(c) => {
                f(c);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Cached relationships of a table.
    pub fn relationships(&self, table: &str) -> Option<Vec<Relationship>> {
        self.relationships
            .get(table)
            .map(|entry| entry.value().clone())
    }

    /// Store the relationships of a table.
    pub fn set_relationships(&self, table: &str, relationships: Vec<Relationship>) {
        self.relationships.insert(table.to_string(), relationships);
    }

    /// Check if the relationships of a table are cached.
    pub fn has_relationships(&self, table: &str) -> bool {
        self.relationships.contains_key(table)
    }

    // =========================================================================
    // Choice options
    // =========================================================================

    /// Cached options of a choice column.
    pub fn choices(&self, table: &str, column: &str) -> Option<Vec<ChoiceOption>> {
        self.choices
            .get(&(table.to_string(), column.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Store the options of a choice column.
    pub fn set_choices(&self, table: &str, column: &str, options: Vec<ChoiceOption>) {
        self.choices
            .insert((table.to_string(), column.to_string()), options);
    }

    // =========================================================================
    // Stats
    // =========================================================================

    /// Number of cached entries per kind.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            column_tables: self.columns.len(),
            relationship_tables: self.relationships.len(),
            choice_columns: self.choices.len(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Tables with cached columns.
    pub column_tables: usize,
    /// Tables with cached relationships.
    pub relationship_tables: usize,
    /// Columns with cached options.
    pub choice_columns: usize,
}
