//! HttpMetadataProvider implementation.
//!
//! This module provides the primary MetadataProvider implementation that
//! uses the MetadataClient for requests to the Web API.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::mapper;
use super::provider::{MetadataProvider, MetadataResult};
use super::types::{ChoiceOption, Column, ColumnType, Relationship, Table};
use crate::client::protocol::{
    self, paths, CurrentOrganizationResponse, ODataCollection, RawAttribute,
    RawChoiceAttribute, RawEntity, RawManyToManyRelationship, RawOneToManyRelationship,
};
use crate::client::{ClientError, MetadataClient};

/// MetadataProvider implementation backed by the Web API.
///
/// # Example
///
/// ```ignore
/// use schemascope::client::MetadataClient;
/// use schemascope::metadata::HttpMetadataProvider;
///
/// let client = MetadataClient::new("https://contoso.crm.dynamics.com")?;
/// let provider = HttpMetadataProvider::with_client(client);
///
/// let tables = provider.list_tables().await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpMetadataProvider {
    client: Arc<MetadataClient>,
}

impl HttpMetadataProvider {
    /// Create a provider around a shared client.
    pub fn new(client: Arc<MetadataClient>) -> Self {
        Self { client }
    }

    /// Create a provider with an owned client.
    pub fn with_client(client: MetadataClient) -> Self {
        Self::new(Arc::new(client))
    }

    /// The underlying client.
    pub fn client(&self) -> &MetadataClient {
        &self.client
    }
}

#[async_trait]
impl MetadataProvider for HttpMetadataProvider {
    async fn list_tables(&self) -> MetadataResult<Vec<Table>> {
        let response: ODataCollection<RawEntity> =
            self.client.get_json(&paths::list_entities()).await?;

        Ok(response.value.iter().map(mapper::map_entity).collect())
    }

    async fn list_columns(&self, table: &str) -> MetadataResult<Vec<Column>> {
        let response: ODataCollection<RawAttribute> =
            self.client.get_json(&paths::attributes(table)).await?;

        Ok(mapper::map_attributes(table, &response.value))
    }

    async fn list_relationships(&self, table: &str) -> MetadataResult<Vec<Relationship>> {
        let one_to_many_path = paths::one_to_many(table);
        let many_to_one_path = paths::many_to_one(table);
        let many_to_many_path = paths::many_to_many(table);

        let (one_to_many, many_to_one, many_to_many) = futures::try_join!(
            self.client
                .get_json::<ODataCollection<RawOneToManyRelationship>>(&one_to_many_path),
            self.client
                .get_json::<ODataCollection<RawOneToManyRelationship>>(&many_to_one_path),
            self.client
                .get_json::<ODataCollection<RawManyToManyRelationship>>(&many_to_many_path),
        )?;

        let mut relationships = Vec::with_capacity(
            one_to_many.value.len() + many_to_one.value.len() + many_to_many.value.len(),
        );
        relationships.extend(one_to_many.value.iter().map(mapper::map_one_to_many));
        relationships.extend(many_to_one.value.iter().map(mapper::map_many_to_one));
        relationships.extend(
            many_to_many
                .value
                .iter()
                .map(|r| mapper::map_many_to_many(table, r)),
        );

        Ok(relationships)
    }

    async fn choice_options(
        &self,
        table: &str,
        column: &str,
        column_type: Option<&ColumnType>,
    ) -> MetadataResult<Vec<ChoiceOption>> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(cast) = column_type.and_then(|t| protocol::choice_metadata_cast(t.as_str())) {
            candidates.push(paths::choice_options_cast(table, column, cast));
        }
        candidates.push(paths::choice_options_generic(table, column));

        let mut last_error = None;
        for path in &candidates {
            match self.client.get_json::<RawChoiceAttribute>(path).await {
                Ok(data) => {
                    return Ok(mapper::map_option_sets(
                        data.option_set.as_ref(),
                        data.global_option_set.as_ref(),
                    )
                    .unwrap_or_default());
                }
                Err(e) => {
                    debug!(table, column, error = %e, "choice option request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::Other("No request issued".to_string())))
    }

    async fn environment_id(&self) -> MetadataResult<String> {
        let response: CurrentOrganizationResponse =
            self.client.get_json(&paths::current_organization()).await?;

        response
            .environment_id()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Other("Unable to resolve environment id".to_string()))
    }
}
