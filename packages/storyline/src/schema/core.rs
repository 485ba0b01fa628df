//! The attribute schema registry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use tracing::debug;

use super::definition::{FieldDefinition, SchemaDefinition};
use super::types::{
    Category, Classification, ElementKind, FieldLocation, FieldSpec, FieldValue, ValueKind,
};
use crate::error::{Result, StorylineError};

/// Schema definition shipped with the crate.
pub const BUNDLED_SCHEMA: &str = include_str!("../../assets/storyline_schema.yaml");

/// Name of the data object discriminator attribute.
pub const DATA_OBJECT_TYPE_FIELD: &str = "type";

#[allow(clippy::expect_used)] // Bundled asset is validated by the test suite
static BUNDLED: LazyLock<SchemaRegistry> = LazyLock::new(|| {
    SchemaRegistry::from_yaml_str(BUNDLED_SCHEMA).expect("bundled schema definition is valid")
});

/// Fields of one element kind, in declaration order.
#[derive(Debug, Default)]
struct ElementSchema {
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, usize>,
    ranges: Vec<(String, String)>,
}

impl ElementSchema {
    fn insert(&mut self, spec: FieldSpec) -> Result<()> {
        if let Some(&existing) = self.by_name.get(&spec.name) {
            if self.fields[existing].kind != spec.kind {
                return Err(StorylineError::SchemaAsset(format!(
                    "field '{}' is declared twice with different kinds",
                    spec.name
                )));
            }
            return Ok(());
        }
        self.by_name.insert(spec.name.clone(), self.fields.len());
        self.fields.push(spec);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }
}

/// A named bundle of article attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub description: Option<String>,
    /// Typed values in name order.
    pub values: Vec<(String, FieldValue)>,
}

/// Read-only catalog of recognized fields per element kind.
///
/// The registry never rejects a name it does not know: [`classify`] simply
/// answers [`Classification::Unknown`] and callers keep such fields as
/// opaque passthrough data.
///
/// [`classify`]: SchemaRegistry::classify
#[derive(Debug)]
pub struct SchemaRegistry {
    version: String,
    storyline: ElementSchema,
    article: ElementSchema,
    data_object: ElementSchema,
    /// Data object type -> type-specific field names.
    type_fields: BTreeMap<String, Vec<String>>,
    presets: BTreeMap<String, Preset>,
}

impl SchemaRegistry {
    /// The process-wide registry built from the bundled definition.
    #[must_use]
    pub fn bundled() -> &'static SchemaRegistry {
        &BUNDLED
    }

    /// Build a registry from a YAML schema definition.
    ///
    /// Defaults, range pairs and presets are checked against their own
    /// declared domains, so a registry that loads is self-consistent.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let definition: SchemaDefinition = serde_yaml_ng::from_str(yaml)?;
        Self::from_definition(definition)
    }

    /// Build a registry from a schema definition file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        let registry = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), version = %registry.version, "loaded schema definition");
        Ok(registry)
    }

    fn from_definition(definition: SchemaDefinition) -> Result<Self> {
        let storyline = build_element("storyline", definition.storyline.fields, definition.storyline.ranges)?;
        let article = build_element("article", definition.article.fields, definition.article.ranges)?;

        let mut data_object = build_element(
            "data_object",
            definition.data_object.common,
            Vec::new(),
        )?;
        let type_domain = match data_object.get(DATA_OBJECT_TYPE_FIELD).map(|s| &s.kind) {
            Some(ValueKind::Enum { values }) => Some(values.clone()),
            Some(_) => None,
            None => {
                return Err(StorylineError::SchemaAsset(
                    "data_object.common must declare the 'type' field".to_string(),
                ))
            }
        };

        let mut type_fields = BTreeMap::new();
        for (object_type, fields) in definition.data_object.by_type {
            if let Some(domain) = &type_domain {
                if !domain.contains(&object_type) {
                    return Err(StorylineError::SchemaAsset(format!(
                        "data_object.by_type lists '{object_type}', which is not a declared type"
                    )));
                }
            }
            let mut names = Vec::with_capacity(fields.len());
            for field in fields {
                names.push(field.name.clone());
                data_object.insert(convert_field("data_object", field)?)?;
            }
            type_fields.insert(object_type, names);
        }
        data_object.ranges = definition.data_object.ranges;
        check_ranges("data_object", &data_object)?;

        let mut presets = BTreeMap::new();
        for (name, preset) in definition.presets {
            let mut values = Vec::with_capacity(preset.values.len());
            for (field, raw) in preset.values {
                let spec = article
                    .get(&field)
                    .filter(|s| s.location == FieldLocation::Attribute)
                    .ok_or_else(|| {
                        StorylineError::SchemaAsset(format!(
                            "preset '{name}' sets '{field}', which is not an article attribute"
                        ))
                    })?;
                let value = spec.kind.convert(&raw).map_err(|problem| {
                    StorylineError::SchemaAsset(format!("preset '{name}' field '{field}': {problem}"))
                })?;
                values.push((field, value));
            }
            presets.insert(
                name.clone(),
                Preset {
                    name,
                    description: preset.description,
                    values,
                },
            );
        }

        debug!(
            version = %definition.version,
            storyline_fields = storyline.fields.len(),
            article_fields = article.fields.len(),
            data_object_fields = data_object.fields.len(),
            presets = presets.len(),
            "built schema registry"
        );

        Ok(Self {
            version: definition.version,
            storyline,
            article,
            data_object,
            type_fields,
            presets,
        })
    }

    fn element(&self, kind: ElementKind) -> &ElementSchema {
        match kind {
            ElementKind::Storyline => &self.storyline,
            ElementKind::DataObject => &self.data_object,
            ElementKind::Article => &self.article,
        }
    }

    /// Version string of the schema definition.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Classify an attribute name of an element kind.
    ///
    /// # Examples
    /// ```
    /// use ootp_storyline::schema::{ElementKind, SchemaRegistry};
    ///
    /// let registry = SchemaRegistry::bundled();
    /// assert!(registry.classify(ElementKind::Storyline, "random_frequency").is_known());
    /// assert!(!registry.classify(ElementKind::Storyline, "mod_flavour").is_known());
    /// ```
    #[must_use]
    pub fn classify(&self, kind: ElementKind, name: &str) -> Classification<'_> {
        self.classify_at(kind, name, FieldLocation::Attribute)
    }

    /// Classify a child element tag of an element kind.
    #[must_use]
    pub fn classify_child(&self, kind: ElementKind, tag: &str) -> Classification<'_> {
        self.classify_at(kind, tag, FieldLocation::Child)
    }

    fn classify_at(&self, kind: ElementKind, name: &str, location: FieldLocation) -> Classification<'_> {
        match self.element(kind).get(name) {
            Some(spec) if spec.location == location => Classification::Known(spec),
            _ => Classification::Unknown,
        }
    }

    /// All fields of an element kind in declaration order.
    #[must_use]
    pub fn fields(&self, kind: ElementKind) -> &[FieldSpec] {
        &self.element(kind).fields
    }

    /// Required attribute fields of an element kind.
    pub fn required_fields(&self, kind: ElementKind) -> impl Iterator<Item = &FieldSpec> {
        self.fields(kind)
            .iter()
            .filter(|s| s.required && s.location == FieldLocation::Attribute)
    }

    /// Article attributes in a category.
    pub fn fields_in_category(&self, category: Category) -> impl Iterator<Item = &FieldSpec> {
        self.article
            .fields
            .iter()
            .filter(move |s| s.category == Some(category))
    }

    /// Declared `(min_field, max_field)` pairs of an element kind.
    #[must_use]
    pub fn range_pairs(&self, kind: ElementKind) -> &[(String, String)] {
        &self.element(kind).ranges
    }

    /// Declared data object types, if the type field is enumerated.
    #[must_use]
    pub fn data_object_types(&self) -> Vec<&str> {
        match self.data_object.get(DATA_OBJECT_TYPE_FIELD).map(|s| &s.kind) {
            Some(ValueKind::Enum { values }) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Attribute names applicable to a data object type.
    ///
    /// Common attributes plus the type-specific ones, sorted and without
    /// the `type` discriminator itself.
    #[must_use]
    pub fn attributes_for_type(&self, object_type: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .data_object
            .fields
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| {
                *name != DATA_OBJECT_TYPE_FIELD
                    && !self.type_fields.values().flatten().any(|f| f == name)
            })
            .collect();
        if let Some(specific) = self.type_fields.get(object_type) {
            names.extend(specific.iter().map(String::as_str));
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// All presets in name order.
    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }
}

fn build_element(
    context: &str,
    fields: Vec<FieldDefinition>,
    ranges: Vec<(String, String)>,
) -> Result<ElementSchema> {
    let mut schema = ElementSchema::default();
    for field in fields {
        schema.insert(convert_field(context, field)?)?;
    }
    schema.ranges = ranges;
    check_ranges(context, &schema)?;
    Ok(schema)
}

fn convert_field(context: &str, field: FieldDefinition) -> Result<FieldSpec> {
    if let ValueKind::Enum { values } = &field.kind {
        if values.is_empty() {
            return Err(StorylineError::SchemaAsset(format!(
                "{context}.{}: enumeration has no values",
                field.name
            )));
        }
    }
    let default = field
        .default
        .as_deref()
        .map(|raw| field.kind.convert(raw))
        .transpose()
        .map_err(|problem| {
            StorylineError::SchemaAsset(format!(
                "{context}.{}: default {problem}",
                field.name
            ))
        })?;

    Ok(FieldSpec {
        name: field.name,
        kind: field.kind,
        default,
        required: field.required,
        category: field.category,
        location: field.location,
        description: field.description,
    })
}

fn check_ranges(context: &str, schema: &ElementSchema) -> Result<()> {
    for (min_field, max_field) in &schema.ranges {
        for name in [min_field, max_field] {
            match schema.get(name).map(|s| &s.kind) {
                Some(ValueKind::Integer { .. }) => {}
                _ => {
                    return Err(StorylineError::SchemaAsset(format!(
                        "{context}: range field '{name}' is not a declared integer field"
                    )))
                }
            }
        }
    }
    Ok(())
}
