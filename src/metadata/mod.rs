//! Metadata provider module.
//!
//! This module provides the domain records for tables, columns and
//! relationships, the mapper from raw API records, and the abstraction for
//! fetching them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataProvider                           │
//! │  - list_tables()            - choice_options()                  │
//! │  - list_columns()           - environment_id()                  │
//! │  - list_relationships()                                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │      HttpMetadataProvider  ──►  MetadataClient + mapper         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemascope::client::MetadataClient;
//! use schemascope::metadata::{HttpMetadataProvider, MetadataProvider};
//!
//! let client = MetadataClient::new("https://contoso.crm.dynamics.com")?;
//! let provider = HttpMetadataProvider::with_client(client);
//!
//! let tables = provider.list_tables().await?;
//! let columns = provider.list_columns("account").await?;
//! ```

mod http_provider;
pub mod mapper;
mod provider;
mod types;

pub use http_provider::HttpMetadataProvider;
pub use provider::{MetadataProvider, MetadataResult};
pub use types::*;
