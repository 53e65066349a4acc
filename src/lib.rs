//! # schemascope
//!
//! A read-only explorer for Dataverse table metadata.
//!
//! ## Architecture
//!
//! schemascope fetches metadata lazily and keeps it for the session:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │               Web API  (/api/data/v9.2)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [client]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Raw OData records + ClientError                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata: mapper, provider]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Table / Column / Relationship / ChoiceOption      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [loader + cache]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Per-key load state (idle/loading/success/error)      │
//! └─────────────────────────────────────────────────────────┘
//!                │                          │
//!                ▼ [search]                 ▼ [diagram]
//! ┌──────────────────────────┐  ┌──────────────────────────┐
//! │  Filtered tables/columns │  │  Mermaid erDiagram text  │
//! └──────────────────────────┘  └──────────────────────────┘
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod diagram;
pub mod links;
pub mod loader;
pub mod metadata;
pub mod search;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::MetadataCache;
    pub use crate::client::{ClientError, MetadataClient};
    pub use crate::config::Settings;
    pub use crate::diagram::{build_er_diagram, DiagramInput, ErDiagram, ErDiagramBuilder};
    pub use crate::loader::{DataLoader, FlightPolicy, LoadStatus, LoaderOptions};
    pub use crate::metadata::{
        ChoiceOption, Column, ColumnType, HttpMetadataProvider, MetadataProvider, Relationship,
        RelationshipKind, Requirement, Table,
    };
    pub use crate::search::{filter_columns, filter_tables};
}
