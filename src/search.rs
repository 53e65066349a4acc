//! Token-based search over table and column names.
//!
//! Queries and targets are normalized the same way: camelCase boundaries
//! become spaces, `_ - .` become spaces, anything outside `[a-z0-9]` is
//! dropped. A target matches when every query token is a substring of the
//! target's normalized text.
//!
//! ```text
//! "AccountNumber"  -> ["account", "number"]
//! "new_custom-id"  -> ["new", "custom", "id"]
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::{Column, Table};

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-.]").expect("valid regex"));
static NON_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));

/// Split text into lowercase search tokens.
#[must_use]
pub fn normalize_search_text(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let spaced = CAMEL_BOUNDARY.replace_all(text, "$1 $2").to_lowercase();
    let spaced = SEPARATORS.replace_all(&spaced, " ");
    let cleaned = NON_TOKEN.replace_all(&spaced, "");

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Check if every token occurs in the normalized target.
///
/// An empty token list matches everything.
#[must_use]
pub fn matches_search(target: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }

    let haystack = normalize_search_text(target).join(" ");
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}

/// Tokens of a query, or `None` when the query filters nothing.
fn query_tokens(query: &str) -> Option<Vec<String>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    let tokens = normalize_search_text(trimmed);
    (!tokens.is_empty()).then_some(tokens)
}

/// Tables whose display name or logical name match `query`, in input order.
#[must_use]
pub fn filter_tables<'a>(tables: &'a [Table], query: &str) -> Vec<&'a Table> {
    let Some(tokens) = query_tokens(query) else {
        return tables.iter().collect();
    };

    tables
        .iter()
        .filter(|t| {
            matches_search(&t.display_name, &tokens) || matches_search(&t.logical_name, &tokens)
        })
        .collect()
}

/// Columns whose display name or logical name match `query`, in input order.
#[must_use]
pub fn filter_columns<'a>(columns: &'a [Column], query: &str) -> Vec<&'a Column> {
    let Some(tokens) = query_tokens(query) else {
        return columns.iter().collect();
    };

    columns
        .iter()
        .filter(|c| {
            matches_search(&c.display_name, &tokens) || matches_search(&c.logical_name, &tokens)
        })
        .collect()
}
