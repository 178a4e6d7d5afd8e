//! Semantic manifest: models, relationships and enum definitions.
//!
//! A manifest is loaded once (usually from JSON) and then shared read-only
//! as `Arc<Manifest>`. Every collection defaults to empty when absent from
//! the source document.
//!
//! ```ignore
//! let manifest = Manifest::from_json(r#"{"enums": [{"name": "Status", "values": [{"name": "OPEN"}]}]}"#)?;
//! let status = manifest.enum_definition("Status").unwrap();
//! assert!(status.value_of("OPEN").is_some());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised while building or loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Enum definition name must not be empty")]
    EmptyEnumName,

    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
}

pub type ManifestResult<T> = Result<T, ManifestError>;

/// Free-form string properties attached to manifest objects.
///
/// Ordered so that definitions holding properties can be hashed.
pub type Properties = BTreeMap<String, String>;

// =============================================================================
// Enums
// =============================================================================

/// A single member of an enum definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            properties: Properties::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Deserialize)]
struct RawEnumDefinition {
    name: String,
    values: Vec<EnumValue>,
    #[serde(default)]
    properties: Properties,
}

/// A named, ordered set of values.
///
/// The name is never empty; both [`EnumDefinition::new`] and
/// deserialization enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEnumDefinition")]
pub struct EnumDefinition {
    name: String,
    values: Vec<EnumValue>,
    properties: Properties,
}

impl TryFrom<RawEnumDefinition> for EnumDefinition {
    type Error = ManifestError;

    fn try_from(raw: RawEnumDefinition) -> Result<Self, Self::Error> {
        EnumDefinition::new(raw.name, raw.values, raw.properties)
    }
}

impl EnumDefinition {
    pub fn new(
        name: impl Into<String>,
        values: Vec<EnumValue>,
        properties: Properties,
    ) -> ManifestResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ManifestError::EmptyEnumName);
        }
        Ok(Self {
            name,
            values,
            properties,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The first value with the given name.
    ///
    /// Duplicate names are not rejected at load time, so with duplicates
    /// the earliest entry wins.
    pub fn value_of(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

// =============================================================================
// Models and relationships
// =============================================================================

/// A column of a semantic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default)]
    pub is_calculated: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// A semantic model backed by a SQL reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    pub ref_sql: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl Model {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// A join path between two models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub name: String,
    pub models: Vec<String>,
    pub join_type: JoinType,
    pub condition: String,
}

// =============================================================================
// Manifest
// =============================================================================

/// The full semantic layer definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default, rename = "enums")]
    pub enum_definitions: Vec<EnumDefinition>,
}

impl Manifest {
    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> ManifestResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ManifestResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    pub fn enum_definition(&self, name: &str) -> Option<&EnumDefinition> {
        self.enum_definitions.iter().find(|e| e.name == name)
    }
}
