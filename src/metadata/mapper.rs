//! Raw API record → domain record conversion.
//!
//! Pure functions, no I/O. The HTTP provider runs every response through
//! here before it reaches the loader.

use tracing::warn;

use super::types::{
    ChoiceOption, Column, ColumnType, Relationship, RelationshipKind, Requirement, Table,
};
use crate::client::protocol::{
    Label, RawAttribute, RawEntity, RawManyToManyRelationship, RawOneToManyRelationship,
    RawOption, RawOptionSet,
};

/// Display name used when the vendor has no label at all.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Resolve a label: user-localized label, then the first localized label.
///
/// Empty labels are skipped. Returns `None` when nothing usable exists.
pub fn resolve_label(label: Option<&Label>) -> Option<String> {
    let label = label?;

    if let Some(text) = label
        .user_localized_label
        .as_ref()
        .and_then(|l| l.label.as_deref())
        .filter(|s| !s.is_empty())
    {
        return Some(text.to_string());
    }

    label
        .localized_labels
        .as_ref()
        .and_then(|labels| labels.first())
        .and_then(|l| l.label.as_deref())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Display name of a table or column, `"Unknown"` when unresolved.
pub fn display_name(label: Option<&Label>) -> String {
    resolve_label(label).unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Label of a choice option; falls back to the stringified value.
pub fn option_label(label: Option<&Label>, value: i64) -> String {
    resolve_label(label).unwrap_or_else(|| value.to_string())
}

/// Map raw options, dropping entries without a numeric value.
pub fn map_options(options: &[RawOption]) -> Vec<ChoiceOption> {
    options
        .iter()
        .filter_map(|option| {
            let value = option.value?;
            Some(ChoiceOption {
                value,
                label: option_label(option.label.as_ref(), value),
            })
        })
        .collect()
}

/// Options of the local option set, or of the global one when there is no
/// local set. A present set without `Options` yields `None`.
pub fn map_option_sets(
    option_set: Option<&RawOptionSet>,
    global_option_set: Option<&RawOptionSet>,
) -> Option<Vec<ChoiceOption>> {
    option_set
        .or(global_option_set)
        .and_then(|s| s.options.as_ref())
        .map(|options| map_options(options))
}

/// Map one entity listing record. Columns and relationships start empty.
pub fn map_entity(entity: &RawEntity) -> Table {
    Table {
        logical_name: entity.logical_name.clone(),
        display_name: display_name(entity.display_name.as_ref()),
        object_type_code: entity.object_type_code.unwrap_or_default(),
        is_custom_entity: entity.is_custom_entity,
        columns: Vec::new(),
        relationships: Vec::new(),
    }
}

/// Check if an attribute is hidden from the column list.
///
/// Virtual attributes, logical attributes and auxiliaries of another
/// attribute (name shadows of lookups and the like) are excluded.
pub fn is_excluded_attribute(attribute: &RawAttribute) -> bool {
    attribute.attribute_type == "Virtual"
        || attribute.is_logical
        || attribute
            .attribute_of
            .as_deref()
            .is_some_and(|of| !of.is_empty())
}

/// Map one attribute record.
pub fn map_attribute(attribute: &RawAttribute) -> Column {
    let requirement = attribute
        .required_level
        .as_ref()
        .map(|level| Requirement::from_required_level(&level.value))
        .unwrap_or(Requirement::Optional);

    let mut column = Column {
        logical_name: attribute.logical_name.clone(),
        display_name: display_name(attribute.display_name.as_ref()),
        column_type: ColumnType::from_attribute_type(&attribute.attribute_type),
        requirement,
        is_primary_key: attribute.is_primary_id,
        max_length: attribute.max_length,
        lookup_targets: attribute
            .targets
            .as_ref()
            .filter(|targets| !targets.is_empty())
            .cloned(),
        options: None,
        option_count: None,
    };

    if let Some(options) = map_option_sets(
        attribute.option_set.as_ref(),
        attribute.global_option_set.as_ref(),
    ) {
        column.set_options(options);
    }

    column
}

/// Filter and map the attribute list of one table.
pub fn map_attributes(table: &str, attributes: &[RawAttribute]) -> Vec<Column> {
    let columns: Vec<Column> = attributes
        .iter()
        .filter(|a| !is_excluded_attribute(a))
        .map(map_attribute)
        .collect();

    let primary_keys = columns.iter().filter(|c| c.is_primary_key).count();
    if primary_keys != 1 {
        warn!(table, primary_keys, "expected exactly one primary key column");
    }

    columns
}

/// Map a one-to-many record, as seen from the referenced table.
pub fn map_one_to_many(relationship: &RawOneToManyRelationship) -> Relationship {
    Relationship {
        kind: RelationshipKind::OneToMany,
        schema_name: relationship.schema_name.clone(),
        related_table_logical_name: relationship.referencing_entity.clone().unwrap_or_default(),
        referencing_attribute: relationship.referencing_attribute.clone(),
        referenced_attribute: relationship.referenced_attribute.clone(),
        intersect_entity_name: None,
    }
}

/// Map a many-to-one record, as seen from the referencing table.
pub fn map_many_to_one(relationship: &RawOneToManyRelationship) -> Relationship {
    Relationship {
        kind: RelationshipKind::ManyToOne,
        schema_name: relationship.schema_name.clone(),
        related_table_logical_name: relationship.referenced_entity.clone().unwrap_or_default(),
        referencing_attribute: relationship.referencing_attribute.clone(),
        referenced_attribute: relationship.referenced_attribute.clone(),
        intersect_entity_name: None,
    }
}

/// Map a many-to-many record. The related table is the side that is not
/// `table`; a self-referencing relationship relates the table to itself.
pub fn map_many_to_many(table: &str, relationship: &RawManyToManyRelationship) -> Relationship {
    let entity1 = relationship.entity1_logical_name.as_deref().unwrap_or_default();
    let entity2 = relationship.entity2_logical_name.as_deref().unwrap_or_default();

    let related = if entity1.eq_ignore_ascii_case(table) && !entity2.is_empty() {
        entity2
    } else if entity1.is_empty() {
        entity2
    } else {
        entity1
    };

    Relationship {
        kind: RelationshipKind::ManyToMany,
        schema_name: relationship.schema_name.clone(),
        related_table_logical_name: related.to_string(),
        referencing_attribute: None,
        referenced_attribute: None,
        intersect_entity_name: relationship
            .intersect_entity_name
            .clone()
            .filter(|name| !name.is_empty()),
    }
}
