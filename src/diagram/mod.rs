//! Mermaid ER diagrams for a single table.
//!
//! The focal table is drawn with its non-system columns; related tables
//! appear as stubs carrying only the keys implied by the visible
//! relationships.
//!
//! # Example
//!
//! ```ignore
//! use schemascope::diagram::{build_er_diagram, DiagramInput};
//!
//! let diagram = build_er_diagram(DiagramInput {
//!     table_logical_name: "account",
//!     columns: &table.columns,
//!     relationships: &table.relationships,
//!     custom_lookup: Some(&custom),
//! });
//! println!("{}", diagram.code);
//! eprintln!("{}", diagram.summary());
//! ```

mod builder;
mod deny_list;
mod filter;
pub mod format;
mod parse;

pub use builder::{build_er_diagram, DiagramInput, ErDiagram, ErDiagramBuilder};
pub use deny_list::{DenyListError, SystemColumnDenyList};
pub use filter::{filter_relationships, is_system_column, FilterContext, FilteredRelationships};
pub use format::Cardinality;
pub use parse::{
    parse_er_diagram, DiagramParseError, ParsedAttribute, ParsedDiagram, ParsedEntity,
    ParsedRelationship,
};
