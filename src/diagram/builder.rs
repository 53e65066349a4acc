//! Mermaid ER diagram generation for one focal table.
//!
//! # Output Layout
//!
//! ```text
//! erDiagram
//!   <focal> {            focal block, or a bare `  <focal>` line
//!     <type> <name> [PK]
//!   }
//!   <related> {          one stub per related table, sorted
//!     guid <attr> PK     many-to-one referenced attributes
//!     lookup <attr>      one-to-many referencing attributes
//!   }
//!   <focal> <cardinality> <related> : "<label>"
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use super::deny_list::SystemColumnDenyList;
use super::filter::{filter_relationships, is_system_column, FilterContext};
use super::format::{
    map_to_mermaid_type, relationship_label, sanitize_entity_name, Cardinality, IndentWriter,
};
use crate::metadata::{Column, Relationship, RelationshipKind};

/// Everything the diagram is built from.
#[derive(Debug, Clone, Copy)]
pub struct DiagramInput<'a> {
    pub table_logical_name: &'a str,
    pub columns: &'a [Column],
    pub relationships: &'a [Relationship],
    /// Lowercase table logical name → is custom. Without it, one-to-many
    /// and many-to-many relationships are all omitted.
    pub custom_lookup: Option<&'a HashMap<String, bool>>,
}

/// A generated diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErDiagram {
    pub code: String,
    pub omitted_relationship_count: usize,
    pub omitted_column_count: usize,
    pub relationship_count: usize,
}

impl ErDiagram {
    /// Human-readable note about what was left out.
    pub fn summary(&self) -> String {
        format!(
            "Omits {} system relationships and {} system columns",
            self.omitted_relationship_count, self.omitted_column_count
        )
    }
}

#[derive(Debug, Default)]
struct Stub {
    primary_keys: BTreeSet<String>,
    lookups: BTreeSet<String>,
}

/// Builds diagrams against a fixed deny-list.
#[derive(Debug, Clone, Default)]
pub struct ErDiagramBuilder {
    deny_list: SystemColumnDenyList,
}

impl ErDiagramBuilder {
    pub fn new(deny_list: SystemColumnDenyList) -> Self {
        Self { deny_list }
    }

    pub fn deny_list(&self) -> &SystemColumnDenyList {
        &self.deny_list
    }

    /// Build the diagram. Identical input yields byte-identical output.
    pub fn build(&self, input: DiagramInput<'_>) -> ErDiagram {
        let focal = sanitize_entity_name(input.table_logical_name);
        let focal_primary_key = input
            .columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.logical_name.as_str());

        let mut columns_by_name: HashMap<String, &Column> = HashMap::new();
        let mut system_columns = BTreeSet::new();
        let mut attribute_lines = Vec::new();

        for column in input.columns {
            let lowercase = column.logical_name.to_lowercase();
            columns_by_name.insert(lowercase.clone(), column);

            if is_system_column(column, &self.deny_list) {
                system_columns.insert(lowercase);
                continue;
            }

            let pk = if column.is_primary_key { " PK" } else { "" };
            attribute_lines.push(format!(
                "{} {}{}",
                map_to_mermaid_type(column.column_type.as_str()),
                column.logical_name,
                pk
            ));
        }

        let filtered = filter_relationships(
            input.relationships,
            &FilterContext {
                deny_list: &self.deny_list,
                system_columns: &system_columns,
                columns: &columns_by_name,
                custom_lookup: input.custom_lookup,
            },
        );

        let mut stubs: BTreeMap<String, Stub> = BTreeMap::new();
        for rel in &filtered.visible {
            if rel.related_table_logical_name.is_empty() {
                continue;
            }
            let stub = stubs
                .entry(rel.related_table_logical_name.to_lowercase())
                .or_default();
            let (set, attr) = match rel.kind {
                RelationshipKind::OneToMany => (&mut stub.lookups, &rel.referencing_attribute),
                RelationshipKind::ManyToOne => (&mut stub.primary_keys, &rel.referenced_attribute),
                RelationshipKind::ManyToMany => continue,
            };
            if let Some(attr) = attr.as_deref().filter(|a| !a.is_empty()) {
                set.insert(attr.to_string());
            }
        }

        let mut w = IndentWriter::new();
        w.write_line("erDiagram");
        w.indent();

        write_entity(&mut w, &focal, &attribute_lines);

        for (logical_name, stub) in &stubs {
            let lines: Vec<String> = stub
                .primary_keys
                .iter()
                .map(|pk| format!("guid {pk} PK"))
                .chain(stub.lookups.iter().map(|l| format!("lookup {l}")))
                .collect();
            write_entity(&mut w, &sanitize_entity_name(logical_name), &lines);
        }

        for rel in &filtered.visible {
            w.write_line(&format!(
                "{} {} {} : \"{}\"",
                focal,
                Cardinality::from(rel.kind),
                sanitize_entity_name(&rel.related_table_logical_name),
                relationship_label(rel, focal_primary_key)
            ));
        }

        debug!(
            table = input.table_logical_name,
            relationships = filtered.visible.len(),
            omitted_relationships = filtered.omitted,
            omitted_columns = system_columns.len(),
            "built er diagram"
        );

        ErDiagram {
            code: w.into_string(),
            omitted_relationship_count: filtered.omitted,
            omitted_column_count: system_columns.len(),
            relationship_count: filtered.visible.len(),
        }
    }
}

fn write_entity(w: &mut IndentWriter, name: &str, attributes: &[String]) {
    if attributes.is_empty() {
        w.write_line(name);
        return;
    }

    w.write_line(&format!("{name} {{"));
    w.indent();
    for attr in attributes {
        w.write_line(attr);
    }
    w.dedent();
    w.write_line("}");
}

/// Build a diagram with the embedded deny-list.
pub fn build_er_diagram(input: DiagramInput<'_>) -> ErDiagram {
    ErDiagramBuilder::default().build(input)
}
