//! Fetch-on-demand data access with per-key loading state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use super::resource::{FlightPolicy, LoadStatus, Resource};
use crate::cache::{ChoiceKey, MetadataCache};
use crate::metadata::{ChoiceOption, Column, ColumnType, MetadataProvider, Relationship, Table};

/// Fallback message when a table list load fails without a message.
const TABLES_FAILED: &str = "Failed to load tables";

/// Loader configuration.
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    /// Flight policy for column and relationship loads. Table loads are
    /// always unguarded (retry restarts unconditionally) and choice option
    /// loads are always single-flight.
    pub flight_policy: FlightPolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            flight_policy: FlightPolicy::SingleFlight,
        }
    }
}

/// Session data loader.
///
/// Owns the table list and the loading state of every resource; reads go
/// through the injected [`MetadataCache`] first and through the provider
/// only on a miss.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use schemascope::cache::MetadataCache;
/// use schemascope::loader::{DataLoader, LoaderOptions};
///
/// let loader = DataLoader::start(provider, Arc::new(MetadataCache::new()), LoaderOptions::default());
/// loader.load_columns("account").await;
/// let account = loader.table("account").await;
/// ```
pub struct DataLoader<P: MetadataProvider> {
    provider: Arc<P>,
    cache: Arc<MetadataCache>,
    tables: RwLock<Vec<Table>>,
    table_state: Resource<()>,
    column_state: Resource<String>,
    relationship_state: Resource<String>,
    choice_state: Resource<ChoiceKey>,
    environment_id: OnceCell<String>,
}

impl<P: MetadataProvider> DataLoader<P> {
    /// Create a loader. Nothing is fetched until a `load_*` call.
    pub fn new(provider: Arc<P>, cache: Arc<MetadataCache>, options: LoaderOptions) -> Self {
        Self {
            provider,
            cache,
            tables: RwLock::new(Vec::new()),
            table_state: Resource::new("tables", FlightPolicy::Unguarded),
            column_state: Resource::new("columns", options.flight_policy),
            relationship_state: Resource::new("relationships", options.flight_policy),
            choice_state: Resource::new("choices", FlightPolicy::SingleFlight),
            environment_id: OnceCell::new(),
        }
    }

    /// Create a loader and schedule the table list load on the runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(provider: Arc<P>, cache: Arc<MetadataCache>, options: LoaderOptions) -> Arc<Self>
    where
        P: 'static,
    {
        let loader = Arc::new(Self::new(provider, cache, options));
        let task_loader = Arc::clone(&loader);
        tokio::spawn(async move {
            task_loader.load_tables().await;
        });
        loader
    }

    /// The cache this loader reads through.
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Fetch the table list, replacing whatever was loaded before.
    pub async fn load_tables(&self) {
        let Some(attempt) = self.table_state.begin(&()) else {
            return;
        };

        match self.provider.list_tables().await {
            Ok(tables) => {
                info!(count = tables.len(), "loaded tables");
                *self.tables.write().await = tables;
                attempt.succeed();
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "failed to load tables");
                attempt.fail(if message.is_empty() {
                    TABLES_FAILED.to_string()
                } else {
                    message
                });
            }
        }
    }

    /// Restart the table list fetch regardless of current state.
    pub async fn retry_load_tables(&self) {
        self.load_tables().await;
    }

    /// Snapshot of all tables.
    pub async fn tables(&self) -> Vec<Table> {
        self.tables.read().await.clone()
    }

    /// Snapshot of one table.
    pub async fn table(&self, logical_name: &str) -> Option<Table> {
        self.tables
            .read()
            .await
            .iter()
            .find(|t| t.logical_name == logical_name)
            .cloned()
    }

    /// Lowercase logical name → custom flag, for diagram filtering.
    pub async fn custom_lookup(&self) -> HashMap<String, bool> {
        self.tables
            .read()
            .await
            .iter()
            .map(|t| (t.logical_name.to_lowercase(), t.is_custom_entity))
            .collect()
    }

    /// State of the table list.
    pub fn table_status(&self) -> LoadStatus {
        self.table_state.status(&())
    }

    /// Error of the last failed table list load.
    pub fn table_error(&self) -> Option<String> {
        self.table_state.error(&())
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Load the columns of a table, from cache when possible.
    pub async fn load_columns(&self, logical_name: &str) {
        let key = logical_name.to_string();

        if let Some(columns) = self.cache.columns(logical_name) {
            debug!(table = logical_name, "columns served from cache");
            self.apply_columns(logical_name, columns).await;
            self.column_state.mark_cached(&key);
            return;
        }

        let Some(attempt) = self.column_state.begin(&key) else {
            debug!(
                resource = self.column_state.name(),
                table = logical_name,
                "already loading"
            );
            return;
        };

        match self.provider.list_columns(logical_name).await {
            Ok(mut columns) => {
                info!(table = logical_name, count = columns.len(), "loaded columns");
                self.merge_cached_choices(logical_name, &mut columns);
                self.cache.set_columns(logical_name, columns.clone());
                self.apply_columns(logical_name, columns).await;
                attempt.succeed();
            }
            Err(e) => {
                warn!(table = logical_name, error = %e, "failed to load columns");
                attempt.fail(e.to_string());
            }
        }
    }

    /// State of the columns of a table.
    pub fn column_status(&self, logical_name: &str) -> LoadStatus {
        self.column_state.status(&logical_name.to_string())
    }

    /// Error of the last failed column load of a table.
    pub fn column_error(&self, logical_name: &str) -> Option<String> {
        self.column_state.error(&logical_name.to_string())
    }

    /// Attach options loaded before the columns themselves.
    fn merge_cached_choices(&self, table: &str, columns: &mut [Column]) {
        for column in columns.iter_mut() {
            if let Some(options) = self.cache.choices(table, &column.logical_name) {
                column.set_options(options);
            }
        }
    }

    async fn apply_columns(&self, logical_name: &str, columns: Vec<Column>) {
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.iter_mut().find(|t| t.logical_name == logical_name) {
            table.columns = columns;
        }
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Load the relationships of a table, from cache when possible.
    pub async fn load_relationships(&self, logical_name: &str) {
        let key = logical_name.to_string();

        if let Some(relationships) = self.cache.relationships(logical_name) {
            debug!(table = logical_name, "relationships served from cache");
            self.apply_relationships(logical_name, relationships).await;
            self.relationship_state.mark_cached(&key);
            return;
        }

        let Some(attempt) = self.relationship_state.begin(&key) else {
            debug!(
                resource = self.relationship_state.name(),
                table = logical_name,
                "already loading"
            );
            return;
        };

        match self.provider.list_relationships(logical_name).await {
            Ok(relationships) => {
                info!(
                    table = logical_name,
                    count = relationships.len(),
                    "loaded relationships"
                );
                self.cache
                    .set_relationships(logical_name, relationships.clone());
                self.apply_relationships(logical_name, relationships).await;
                attempt.succeed();
            }
            Err(e) => {
                warn!(table = logical_name, error = %e, "failed to load relationships");
                attempt.fail(e.to_string());
            }
        }
    }

    /// State of the relationships of a table.
    pub fn relationship_status(&self, logical_name: &str) -> LoadStatus {
        self.relationship_state.status(&logical_name.to_string())
    }

    /// Error of the last failed relationship load of a table.
    pub fn relationship_error(&self, logical_name: &str) -> Option<String> {
        self.relationship_state.error(&logical_name.to_string())
    }

    async fn apply_relationships(&self, logical_name: &str, relationships: Vec<Relationship>) {
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.iter_mut().find(|t| t.logical_name == logical_name) {
            table.relationships = relationships;
        }
    }

    // =========================================================================
    // Choice options
    // =========================================================================

    /// Load the options of a choice column.
    ///
    /// `column_type` picks the type-specific request; when `None` it is
    /// taken from the loaded columns, if any. A call made while a request
    /// for the same column is in flight returns immediately.
    pub async fn load_choice_options(
        &self,
        table: &str,
        column: &str,
        column_type: Option<&ColumnType>,
    ) {
        let key: ChoiceKey = (table.to_string(), column.to_string());

        if let Some(options) = self.cache.choices(table, column) {
            debug!(table, column, "choice options served from cache");
            self.apply_choices(table, column, options).await;
            self.choice_state.mark_cached(&key);
            return;
        }

        let Some(attempt) = self.choice_state.begin(&key) else {
            debug!(
                resource = self.choice_state.name(),
                table,
                column,
                "already loading"
            );
            return;
        };

        let column_type = match column_type {
            Some(t) => Some(t.clone()),
            None => self.known_column_type(table, column).await,
        };

        match self
            .provider
            .choice_options(table, column, column_type.as_ref())
            .await
        {
            Ok(options) => {
                info!(table, column, count = options.len(), "loaded choice options");
                self.cache.set_choices(table, column, options.clone());
                self.apply_choices(table, column, options).await;
                attempt.succeed();
            }
            Err(e) => {
                warn!(table, column, error = %e, "failed to load choice options");
                attempt.fail(e.to_string());
            }
        }
    }

    /// State of the options of a choice column.
    pub fn choice_status(&self, table: &str, column: &str) -> LoadStatus {
        self.choice_state
            .status(&(table.to_string(), column.to_string()))
    }

    /// Error of the last failed option load of a choice column.
    pub fn choice_error(&self, table: &str, column: &str) -> Option<String> {
        self.choice_state
            .error(&(table.to_string(), column.to_string()))
    }

    async fn known_column_type(&self, table: &str, column: &str) -> Option<ColumnType> {
        if let Some(c) = self
            .cache
            .columns(table)
            .and_then(|cols| cols.into_iter().find(|c| c.logical_name == column))
        {
            return Some(c.column_type);
        }

        self.tables
            .read()
            .await
            .iter()
            .find(|t| t.logical_name == table)
            .and_then(|t| t.column(column))
            .map(|c| c.column_type.clone())
    }

    async fn apply_choices(&self, table: &str, column: &str, options: Vec<ChoiceOption>) {
        self.cache
            .update_column(table, column, |c| c.set_options(options.clone()));

        let mut tables = self.tables.write().await;
        if let Some(c) = tables
            .iter_mut()
            .find(|t| t.logical_name == table)
            .and_then(|t| t.columns.iter_mut().find(|c| c.logical_name == column))
        {
            c.set_options(options);
        }
    }

    // =========================================================================
    // Environment
    // =========================================================================

    /// Identifier of the current environment, resolved once per session.
    ///
    /// Concurrent callers share one request. A failure is not remembered, so
    /// the next call tries again.
    pub async fn environment_id(&self) -> Result<String, String> {
        self.environment_id
            .get_or_try_init(|| async {
                self.provider.environment_id().await.map_err(|e| {
                    warn!(error = %e, "failed to resolve environment id");
                    e.to_string()
                })
            })
            .await
            .cloned()
    }
}
