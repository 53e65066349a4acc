//! MetadataProvider trait definition.
//!
//! The MetadataProvider trait abstracts over where metadata comes from. The
//! primary implementation is [`super::HttpMetadataProvider`]; tests plug in
//! in-memory providers.

use async_trait::async_trait;

use super::types::{ChoiceOption, Column, ColumnType, Relationship, Table};
use crate::client::ClientError;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, ClientError>;

/// Trait for fetching table metadata.
///
/// Every method is one logical fetch. Implementations return records already
/// mapped into domain types; caching and state tracking live in the loader.
///
/// # Example
///
/// ```ignore
/// use schemascope::metadata::MetadataProvider;
///
/// async fn example(provider: &impl MetadataProvider) -> MetadataResult<()> {
///     let tables = provider.list_tables().await?;
///     let columns = provider.list_columns("account").await?;
///     let relationships = provider.list_relationships("account").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// List all tables valid for advanced find. Columns and relationships
    /// are left empty.
    async fn list_tables(&self) -> MetadataResult<Vec<Table>>;

    /// List the visible columns of a table.
    async fn list_columns(&self, table: &str) -> MetadataResult<Vec<Column>>;

    /// List one-to-many, many-to-one and many-to-many relationships of a
    /// table, in that order.
    async fn list_relationships(&self, table: &str) -> MetadataResult<Vec<Relationship>>;

    /// Fetch the option set of a choice column.
    ///
    /// `column_type` selects the type-specific request shape; `None` goes
    /// straight to the generic attribute fetch.
    async fn choice_options(
        &self,
        table: &str,
        column: &str,
        column_type: Option<&ColumnType>,
    ) -> MetadataResult<Vec<ChoiceOption>>;

    /// Resolve the identifier of the current environment.
    async fn environment_id(&self) -> MetadataResult<String>;
}
