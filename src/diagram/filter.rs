//! System-noise filtering for columns and relationships.

use std::collections::{BTreeSet, HashMap};

use super::deny_list::SystemColumnDenyList;
use crate::metadata::{Column, ColumnType, Relationship, RelationshipKind, Requirement};

/// Check if a column is system noise. A primary key never is.
pub fn is_system_column(column: &Column, deny_list: &SystemColumnDenyList) -> bool {
    if column.is_primary_key {
        return false;
    }
    column.requirement == Requirement::System
        || deny_list.contains(&column.logical_name.to_lowercase())
}

/// What the relationship filter needs to know about the focal table.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub deny_list: &'a SystemColumnDenyList,
    /// Lowercase names of focal columns classified as system.
    pub system_columns: &'a BTreeSet<String>,
    /// Focal columns keyed by lowercase logical name.
    pub columns: &'a HashMap<String, &'a Column>,
    /// Lowercase table logical name → is custom.
    pub custom_lookup: Option<&'a HashMap<String, bool>>,
}

impl FilterContext<'_> {
    fn is_custom(&self, logical_name: Option<&str>) -> Option<bool> {
        let name = logical_name.filter(|n| !n.is_empty())?;
        self.custom_lookup?.get(&name.to_lowercase()).copied()
    }
}

/// Visible relationships and the number dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRelationships<'a> {
    pub visible: Vec<&'a Relationship>,
    pub omitted: usize,
}

/// Split relationships into the visible subset (input order) and an
/// omitted count.
pub fn filter_relationships<'a>(
    relationships: &'a [Relationship],
    ctx: &FilterContext<'_>,
) -> FilteredRelationships<'a> {
    let mut visible = Vec::with_capacity(relationships.len());
    let mut omitted = 0;

    for rel in relationships {
        if is_visible(rel, ctx) {
            visible.push(rel);
        } else {
            omitted += 1;
        }
    }

    FilteredRelationships { visible, omitted }
}

fn is_visible(rel: &Relationship, ctx: &FilterContext<'_>) -> bool {
    let referencing = rel
        .referencing_attribute
        .as_deref()
        .filter(|a| !a.is_empty())
        .map(str::to_lowercase);

    if let Some(attr) = &referencing {
        if ctx.system_columns.contains(attr) || ctx.deny_list.contains(attr) {
            return false;
        }
    }

    match rel.kind {
        RelationshipKind::ManyToOne => {
            let Some(attr) = referencing else {
                return false;
            };
            match ctx.columns.get(&attr) {
                Some(column) => {
                    !is_system_column(column, ctx.deny_list)
                        && column.column_type == ColumnType::Lookup
                }
                None => false,
            }
        }
        RelationshipKind::OneToMany => {
            ctx.is_custom(Some(rel.related_table_logical_name.as_str())) == Some(true)
        }
        RelationshipKind::ManyToMany => {
            ctx.is_custom(Some(rel.related_table_logical_name.as_str())) == Some(true)
                || ctx.is_custom(rel.intersect_entity_name.as_deref()) == Some(true)
        }
    }
}
