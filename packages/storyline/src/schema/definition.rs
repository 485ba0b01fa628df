//! Serde representation of the schema definition asset.
//!
//! These structs mirror the YAML layout one-to-one; the registry converts
//! them into [`FieldSpec`](super::FieldSpec) values after checking them.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::types::{Category, FieldLocation, ValueKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SchemaDefinition {
    pub version: String,
    pub storyline: ElementDefinition,
    pub article: ElementDefinition,
    pub data_object: DataObjectDefinition,
    #[serde(default)]
    pub presets: BTreeMap<String, PresetDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ElementDefinition {
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub ranges: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DataObjectDefinition {
    pub common: Vec<FieldDefinition>,
    #[serde(default)]
    pub by_type: BTreeMap<String, Vec<FieldDefinition>>,
    #[serde(default)]
    pub ranges: Vec<(String, String)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FieldDefinition {
    pub name: String,
    pub kind: ValueKind,
    /// Raw default, converted through `kind` at load time.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub location: FieldLocation,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PresetDefinition {
    #[serde(default)]
    pub description: Option<String>,
    pub values: BTreeMap<String, String>,
}
