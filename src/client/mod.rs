//! HTTP access to the vendor metadata API.
//!
//! This module only knows about URLs, status codes and JSON. Mapping the raw
//! records into domain types happens in [`crate::metadata`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     HttpMetadataProvider                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       MetadataClient                            │
//! │  - GET {org}/api/data/v9.2/{path}                               │
//! │  - fixed per-request timeout (30s)                              │
//! │  - status/transport errors classified into ClientError          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::{MetadataClient, MetadataClientBuilder};
pub use error::{
    ClientError, ClientResult, AUTH_ERROR, NETWORK_ERROR, NOT_FOUND, SERVER_ERROR, TIMEOUT,
};
