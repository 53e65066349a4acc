//! Normalized metadata records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A table (entity) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub logical_name: String,
    pub display_name: String,
    pub object_type_code: i32,
    pub is_custom_entity: bool,
    /// Empty until loaded on demand.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Empty until loaded on demand.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Table {
    /// Get a column by logical name (case-insensitive).
    pub fn column(&self, logical_name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.logical_name.eq_ignore_ascii_case(logical_name))
    }

    /// The primary key column, if columns are loaded.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key)
    }
}

/// A column (attribute) of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub logical_name: String,
    pub display_name: String,
    pub column_type: ColumnType,
    pub requirement: Requirement,
    #[serde(default)]
    pub is_primary_key: bool,
    /// String-like types only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Lookup-like types only; never empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_targets: Option<Vec<String>>,
    /// Choice types only; never empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_count: Option<usize>,
}

impl Column {
    /// Create a column with no optional metadata.
    pub fn new(
        logical_name: impl Into<String>,
        column_type: ColumnType,
        requirement: Requirement,
    ) -> Self {
        let logical_name = logical_name.into();
        Self {
            display_name: logical_name.clone(),
            logical_name,
            column_type,
            requirement,
            is_primary_key: false,
            max_length: None,
            lookup_targets: None,
            options: None,
            option_count: None,
        }
    }

    /// Mark this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Attach choice options, updating the option count.
    pub fn set_options(&mut self, options: Vec<ChoiceOption>) {
        self.option_count = Some(options.len());
        self.options = if options.is_empty() { None } else { Some(options) };
    }

    /// Check if this column holds an enumerated option set.
    pub fn is_choice(&self) -> bool {
        self.column_type.is_choice()
    }
}

/// Column type vocabulary.
///
/// Vendor types outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Integer,
    BigInt,
    Decimal,
    Double,
    Money,
    Boolean,
    DateTime,
    Lookup,
    Owner,
    Picklist,
    State,
    Status,
    MultiSelectPicklist,
    Uniqueidentifier,
    Virtual,
    EntityName,
    ManagedProperty,
    Image,
    File,
    PartyList,
    CalendarRules,
    Other(String),
}

impl ColumnType {
    /// Map a vendor `AttributeType` onto the vocabulary.
    ///
    /// `Memo` folds into `String` and `Customer` folds into `Lookup`.
    pub fn from_attribute_type(attribute_type: &str) -> Self {
        match attribute_type {
            "String" | "Memo" => Self::String,
            "Integer" => Self::Integer,
            "BigInt" => Self::BigInt,
            "Decimal" => Self::Decimal,
            "Double" => Self::Double,
            "Money" => Self::Money,
            "Boolean" => Self::Boolean,
            "DateTime" => Self::DateTime,
            "Lookup" | "Customer" => Self::Lookup,
            "Owner" => Self::Owner,
            "Picklist" => Self::Picklist,
            "State" => Self::State,
            "Status" => Self::Status,
            "MultiSelectPicklist" => Self::MultiSelectPicklist,
            "Uniqueidentifier" => Self::Uniqueidentifier,
            "Virtual" => Self::Virtual,
            "EntityName" => Self::EntityName,
            "ManagedProperty" => Self::ManagedProperty,
            "Image" => Self::Image,
            "File" => Self::File,
            "PartyList" => Self::PartyList,
            "CalendarRules" => Self::CalendarRules,
            other => Self::Other(other.to_string()),
        }
    }

    /// Vendor spelling of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::BigInt => "BigInt",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Money => "Money",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Lookup => "Lookup",
            Self::Owner => "Owner",
            Self::Picklist => "Picklist",
            Self::State => "State",
            Self::Status => "Status",
            Self::MultiSelectPicklist => "MultiSelectPicklist",
            Self::Uniqueidentifier => "Uniqueidentifier",
            Self::Virtual => "Virtual",
            Self::EntityName => "EntityName",
            Self::ManagedProperty => "ManagedProperty",
            Self::Image => "Image",
            Self::File => "File",
            Self::PartyList => "PartyList",
            Self::CalendarRules => "CalendarRules",
            Self::Other(s) => s,
        }
    }

    /// Picklist, State, Status and MultiSelectPicklist.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::Picklist | Self::State | Self::Status | Self::MultiSelectPicklist
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        Self::from_attribute_type(&s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

/// How strongly the platform requires a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requirement {
    /// Required by the platform itself (`SystemRequired`).
    System,
    /// Required by the application (`ApplicationRequired`).
    Required,
    /// Anything else.
    Optional,
}

impl Requirement {
    /// Map a vendor `RequiredLevel.Value`.
    pub fn from_required_level(value: &str) -> Self {
        match value {
            "SystemRequired" => Self::System,
            "ApplicationRequired" => Self::Required,
            _ => Self::Optional,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "System"),
            Self::Required => write!(f, "Required"),
            Self::Optional => write!(f, "Optional"),
        }
    }
}

/// Relationship direction, seen from the table it was loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// The table is referenced by a lookup on the related table.
    OneToMany,
    /// The table holds a lookup to the related table.
    ManyToOne,
    /// Both tables are joined through an intersect table.
    ManyToMany,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToMany => write!(f, "OneToMany"),
            Self::ManyToOne => write!(f, "ManyToOne"),
            Self::ManyToMany => write!(f, "ManyToMany"),
        }
    }
}

/// A relationship between the context table and another table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub schema_name: String,
    pub related_table_logical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersect_entity_name: Option<String>,
}

impl Relationship {
    /// A one-to-many relationship: `related.referencing -> this.referenced`.
    pub fn one_to_many(
        schema_name: impl Into<String>,
        related: impl Into<String>,
        referencing_attribute: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationshipKind::OneToMany,
            schema_name: schema_name.into(),
            related_table_logical_name: related.into(),
            referencing_attribute: Some(referencing_attribute.into()),
            referenced_attribute: None,
            intersect_entity_name: None,
        }
    }

    /// A many-to-one relationship: `this.referencing -> related.referenced`.
    pub fn many_to_one(
        schema_name: impl Into<String>,
        related: impl Into<String>,
        referencing_attribute: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationshipKind::ManyToOne,
            schema_name: schema_name.into(),
            related_table_logical_name: related.into(),
            referencing_attribute: Some(referencing_attribute.into()),
            referenced_attribute: None,
            intersect_entity_name: None,
        }
    }

    /// A many-to-many relationship through an intersect table.
    pub fn many_to_many(
        schema_name: impl Into<String>,
        related: impl Into<String>,
        intersect_entity_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationshipKind::ManyToMany,
            schema_name: schema_name.into(),
            related_table_logical_name: related.into(),
            referencing_attribute: None,
            referenced_attribute: None,
            intersect_entity_name: Some(intersect_entity_name.into()),
        }
    }

    /// Set the referenced attribute.
    pub fn with_referenced(mut self, referenced_attribute: impl Into<String>) -> Self {
        self.referenced_attribute = Some(referenced_attribute.into());
        self
    }
}

/// One entry of a choice column's option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: i64,
    /// Never empty; falls back to the stringified value.
    pub label: String,
}
