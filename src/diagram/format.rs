//! Mermaid formatting utilities.
//!
//! Provides entity name sanitizing, type mapping, relationship labels and
//! indentation management.

use std::fmt;

use crate::metadata::{Relationship, RelationshipKind};

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize_entity_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Map a column type name to one of the Mermaid attribute types.
///
/// Checks run in order; the first hit wins.
#[must_use]
pub fn map_to_mermaid_type(type_name: &str) -> &'static str {
    let t = type_name.to_lowercase();
    match t.as_str() {
        "uniqueidentifier" | "guid" | "uuid" => return "guid",
        "lookup" | "customer" | "owner" => return "lookup",
        _ => {}
    }

    if t.contains("int") || t == "integer" {
        "int"
    } else if ["decimal", "money", "float", "double"]
        .iter()
        .any(|k| t.contains(k))
    {
        "float"
    } else if t.contains("bool") {
        "boolean"
    } else if t.contains("date") || t.contains("time") {
        "datetime"
    } else {
        "string"
    }
}

/// Mermaid cardinality token between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `||--o{`
    OneToMany,
    /// `}o--||`
    ManyToOne,
    /// `}o--o{`
    ManyToMany,
}

impl Cardinality {
    pub const ALL: [Cardinality; 3] = [Self::OneToMany, Self::ManyToOne, Self::ManyToMany];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::OneToMany => "||--o{",
            Self::ManyToOne => "}o--||",
            Self::ManyToMany => "}o--o{",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == symbol)
    }
}

impl From<RelationshipKind> for Cardinality {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::OneToMany => Self::OneToMany,
            RelationshipKind::ManyToOne => Self::ManyToOne,
            RelationshipKind::ManyToMany => Self::ManyToMany,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Label of a relationship line.
///
/// `focal_primary_key` fills in the target of a one-to-many relationship
/// without a referenced attribute.
#[must_use]
pub fn relationship_label(rel: &Relationship, focal_primary_key: Option<&str>) -> String {
    let schema = rel.schema_name.replace('"', "'");
    let lookup = non_empty(rel.referencing_attribute.as_deref());
    let referenced = non_empty(rel.referenced_attribute.as_deref());

    if rel.kind == RelationshipKind::ManyToMany {
        return match non_empty(rel.intersect_entity_name.as_deref()) {
            Some(via) => format!("{schema} (via {via})"),
            None => schema,
        };
    }

    let Some(lookup) = lookup else {
        return schema;
    };

    let target = match rel.kind {
        RelationshipKind::OneToMany => referenced.or(focal_primary_key).unwrap_or("id"),
        _ => referenced.unwrap_or("id"),
    };
    format!("{schema} ({lookup} -> {target})")
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// A writer that manages two-space indentation for Mermaid output.
///
/// Lines are separated by `\n`; there is no trailing newline.
#[derive(Debug, Default)]
pub struct IndentWriter {
    buffer: String,
    current_indent: usize,
}

impl IndentWriter {
    const INDENT: &'static str = "  ";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.current_indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        self.current_indent = self.current_indent.saturating_sub(1);
    }

    /// Write a complete line at the current indentation.
    pub fn write_line(&mut self, s: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        for _ in 0..self.current_indent {
            self.buffer.push_str(Self::INDENT);
        }
        self.buffer.push_str(s);
    }

    /// Consume the writer and return the final string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}
