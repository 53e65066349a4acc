//! Wire types for the Dataverse Web API metadata endpoints.
//!
//! These types mirror the JSON shapes returned under `/api/data/v9.2`. Only
//! the fields the explorer reads are declared; everything else is ignored
//! by serde.

use serde::Deserialize;

/// Default API base path, appended to the organization URL.
pub const API_BASE_PATH: &str = "/api/data/v9.2";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Endpoint paths
// ============================================================================

/// Relative request paths, all resolved against the API base path.
pub mod paths {
    /// Select list used by the table listing.
    const ENTITY_SELECT: &str = "LogicalName,DisplayName,ObjectTypeCode,IsCustomEntity";

    /// Tables valid for advanced find (excludes internal plumbing tables).
    pub fn list_entities() -> String {
        format!(
            "EntityDefinitions?$select={ENTITY_SELECT}&$filter=IsValidForAdvancedFind eq true"
        )
    }

    /// Base path of one entity definition.
    pub fn entity(logical_name: &str) -> String {
        format!("EntityDefinitions(LogicalName='{}')", encode(logical_name))
    }

    /// All attributes of one table. No `$select`, so derived metadata types
    /// keep their extra fields (MaxLength, OptionSet, Targets).
    pub fn attributes(logical_name: &str) -> String {
        format!("{}/Attributes", entity(logical_name))
    }

    /// One-to-many relationships where the table is the referenced side.
    pub fn one_to_many(logical_name: &str) -> String {
        format!(
            "{}/OneToManyRelationships?$select=SchemaName,ReferencingEntity,ReferencingAttribute,ReferencedEntity,ReferencedAttribute",
            entity(logical_name)
        )
    }

    /// Many-to-one relationships where the table is the referencing side.
    pub fn many_to_one(logical_name: &str) -> String {
        format!(
            "{}/ManyToOneRelationships?$select=SchemaName,ReferencingEntity,ReferencingAttribute,ReferencedEntity,ReferencedAttribute",
            entity(logical_name)
        )
    }

    /// Many-to-many relationships the table participates in.
    pub fn many_to_many(logical_name: &str) -> String {
        format!(
            "{}/ManyToManyRelationships?$select=SchemaName,Entity1LogicalName,Entity2LogicalName,IntersectEntityName",
            entity(logical_name)
        )
    }

    /// Base path of one attribute.
    pub fn attribute(entity_name: &str, attribute_name: &str) -> String {
        format!(
            "{}/Attributes(LogicalName='{}')",
            entity(entity_name),
            encode(attribute_name)
        )
    }

    /// Choice options through the type-specific metadata cast.
    pub fn choice_options_cast(entity_name: &str, attribute_name: &str, cast: &str) -> String {
        format!(
            "{}/{cast}?$select=LogicalName,OptionSet,GlobalOptionSet&$expand=OptionSet($select=Options),GlobalOptionSet($select=Options)",
            attribute(entity_name, attribute_name)
        )
    }

    /// Choice options through the generic attribute fetch.
    pub fn choice_options_generic(entity_name: &str, attribute_name: &str) -> String {
        format!(
            "{}?$select=LogicalName,OptionSet,GlobalOptionSet",
            attribute(entity_name, attribute_name)
        )
    }

    /// Current organization details, used for the environment id.
    pub fn current_organization() -> String {
        "RetrieveCurrentOrganization(AccessType='Default')".to_string()
    }

    /// Percent-encode a logical name for use inside an OData key literal.
    pub fn encode(value: &str) -> String {
        url::form_urlencoded::byte_serialize(value.as_bytes())
            .collect::<String>()
            .replace('+', "%20")
    }
}

/// Metadata type cast used for choice option expansion, by attribute type.
pub fn choice_metadata_cast(attribute_type: &str) -> Option<&'static str> {
    match attribute_type {
        "Picklist" => Some("Microsoft.Dynamics.CRM.PicklistAttributeMetadata"),
        "State" => Some("Microsoft.Dynamics.CRM.StateAttributeMetadata"),
        "Status" => Some("Microsoft.Dynamics.CRM.StatusAttributeMetadata"),
        "MultiSelectPicklist" => Some("Microsoft.Dynamics.CRM.MultiSelectPicklistAttributeMetadata"),
        _ => None,
    }
}

// ============================================================================
// Collection envelope
// ============================================================================

/// OData collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

// ============================================================================
// Labels
// ============================================================================

/// A single localized label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalizedLabel {
    #[serde(default)]
    pub label: Option<String>,
}

/// A label with the user's language resolved plus all localizations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    #[serde(default)]
    pub user_localized_label: Option<LocalizedLabel>,
    #[serde(default)]
    pub localized_labels: Option<Vec<LocalizedLabel>>,
}

// ============================================================================
// Entities and attributes
// ============================================================================

/// Entry of `EntityDefinitions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEntity {
    pub logical_name: String,
    #[serde(default)]
    pub display_name: Option<Label>,
    #[serde(default)]
    pub object_type_code: Option<i32>,
    #[serde(default)]
    pub is_custom_entity: bool,
}

/// `RequiredLevel` managed property.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequiredLevel {
    #[serde(default)]
    pub value: String,
}

/// One option of an option set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawOption {
    pub value: Option<i64>,
    #[serde(default)]
    pub label: Option<Label>,
}

/// Local or global option set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawOptionSet {
    #[serde(default)]
    pub options: Option<Vec<RawOption>>,
}

/// Entry of `EntityDefinitions(...)/Attributes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAttribute {
    pub logical_name: String,
    #[serde(default)]
    pub display_name: Option<Label>,
    #[serde(default)]
    pub attribute_type: String,
    /// Present on Lookup, Customer and Owner attributes.
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub required_level: Option<RequiredLevel>,
    #[serde(default)]
    pub is_primary_id: bool,
    /// Derived fields such as lookup name shadows.
    #[serde(default)]
    pub is_logical: bool,
    /// Set when this attribute is an auxiliary of another attribute.
    #[serde(default)]
    pub attribute_of: Option<String>,
    #[serde(default)]
    pub option_set: Option<RawOptionSet>,
    #[serde(default)]
    pub global_option_set: Option<RawOptionSet>,
}

/// Attribute fetched for its options only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawChoiceAttribute {
    #[serde(default)]
    pub option_set: Option<RawOptionSet>,
    #[serde(default)]
    pub global_option_set: Option<RawOptionSet>,
}

// ============================================================================
// Relationships
// ============================================================================

/// One-to-many or many-to-one relationship metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawOneToManyRelationship {
    pub schema_name: String,
    #[serde(default)]
    pub referencing_entity: Option<String>,
    #[serde(default)]
    pub referencing_attribute: Option<String>,
    #[serde(default)]
    pub referenced_entity: Option<String>,
    #[serde(default)]
    pub referenced_attribute: Option<String>,
}

/// Many-to-many relationship metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawManyToManyRelationship {
    pub schema_name: String,
    #[serde(default)]
    pub entity1_logical_name: Option<String>,
    #[serde(default)]
    pub entity2_logical_name: Option<String>,
    #[serde(default)]
    pub intersect_entity_name: Option<String>,
}

// ============================================================================
// Organization
// ============================================================================

/// `Detail` payload of `RetrieveCurrentOrganization`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationDetail {
    #[serde(rename = "EnvironmentId", default)]
    pub environment_id_pascal: Option<String>,
    #[serde(rename = "environmentId", default)]
    pub environment_id_camel: Option<String>,
}

impl OrganizationDetail {
    fn environment_id(&self) -> Option<&str> {
        self.environment_id_pascal
            .as_deref()
            .or(self.environment_id_camel.as_deref())
    }
}

/// Response of `RetrieveCurrentOrganization`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentOrganizationResponse {
    #[serde(rename = "Detail", default)]
    pub detail_pascal: Option<OrganizationDetail>,
    #[serde(rename = "detail", default)]
    pub detail_camel: Option<OrganizationDetail>,
}

impl CurrentOrganizationResponse {
    /// The environment id, whichever casing the service used.
    pub fn environment_id(&self) -> Option<&str> {
        self.detail_pascal
            .as_ref()
            .and_then(OrganizationDetail::environment_id)
            .or_else(|| {
                self.detail_camel
                    .as_ref()
                    .and_then(OrganizationDetail::environment_id)
            })
            .filter(|id| !id.is_empty())
    }
}
