//! Session data loader.
//!
//! Every resource (the table list, the columns and relationships of each
//! table, the options of each choice column) moves through
//! `idle → loading → success | error`. Reads go through
//! [`crate::cache::MetadataCache`] first.
//!
//! Concurrent loads of the same key are collapsed for choice options and,
//! by default, for columns and relationships. The table list is never
//! collapsed: a retry always restarts the fetch.

mod loader;
mod resource;

pub use loader::{DataLoader, LoaderOptions};
pub use resource::{Attempt, FlightPolicy, LoadStatus, Resource};
