//! Record normalization and validation against the schema registry.
//!
//! Both the parser and `upsert` funnel records through [`RecordValidator`],
//! so a record is held to the same rules whichever way it enters the model.

use std::collections::HashSet;

use crate::config::{ARTICLES_ELEMENT, REQUIRED_DATA_ELEMENT};
use crate::error::{Problem, Violation};
use crate::schema::{
    Classification, ElementKind, SchemaRegistry, DATA_OBJECT_TYPE_FIELD,
};

use super::attributes::{AttrValue, Attribute, AttributeMap};
use super::types::StorylineRecord;

/// Name of the id attribute on storylines and articles.
pub const ID_ATTRIBUTE: &str = "id";

/// Checks records against a schema registry.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> RecordValidator<'r> {
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Normalize, validate and check article id uniqueness.
    ///
    /// Returns the normalized record, or every problem found. The input is
    /// consumed either way; callers that must stay unchanged on failure
    /// keep their own state untouched until this returns `Ok`.
    pub fn check(&self, mut record: StorylineRecord) -> Result<StorylineRecord, Vec<Violation>> {
        let mut violations = self.normalize(&mut record);
        violations.extend(self.validate(&record));

        let mut seen = HashSet::new();
        for article in &record.articles {
            if !article.id.is_empty() && !seen.insert(article.id.as_str()) {
                violations.push(
                    Violation::new(
                        ElementKind::Article,
                        ID_ATTRIBUTE,
                        Problem::DuplicateId {
                            id: article.id.clone(),
                        },
                    )
                    .in_storyline(&record.id)
                    .in_article(&article.id),
                );
            }
        }

        if violations.is_empty() {
            Ok(record)
        } else {
            Err(violations)
        }
    }

    /// Bring every attribute into the representation the schema implies.
    ///
    /// Raw values of known attributes are converted to typed values; a raw
    /// value that does not parse is reported and left as it was. Typed
    /// values under names the schema does not know become raw strings.
    pub fn normalize(&self, record: &mut StorylineRecord) -> Vec<Violation> {
        let mut violations = Vec::new();
        let id = record.id.clone();

        self.normalize_map(ElementKind::Storyline, &mut record.attributes)
            .into_iter()
            .for_each(|v| violations.push(v.in_storyline(&id)));
        demote_all(&mut record.required_data_attributes);
        demote_all(&mut record.articles_attributes);

        for (index, object) in record.required_data.iter_mut().enumerate() {
            self.normalize_map(ElementKind::DataObject, &mut object.attributes)
                .into_iter()
                .for_each(|v| violations.push(v.in_storyline(&id).at_index(index)));
        }

        for article in &mut record.articles {
            self.normalize_map(ElementKind::Article, &mut article.attributes)
                .into_iter()
                .for_each(|v| violations.push(v.in_storyline(&id).in_article(&article.id)));
        }

        violations
    }

    fn normalize_map(&self, kind: ElementKind, attributes: &mut AttributeMap) -> Vec<Violation> {
        let mut violations = Vec::new();
        for attribute in attributes.iter_mut() {
            let classification = self.registry.classify(kind, &attribute.name);
            match (classification, &attribute.value) {
                (Classification::Known(spec), AttrValue::Opaque(raw)) => {
                    match spec.kind.parse(raw) {
                        Ok(value) => attribute.promote(value),
                        Err(problem) => {
                            violations.push(Violation::new(kind, &attribute.name, problem));
                        }
                    }
                }
                (Classification::Unknown, AttrValue::Known(value)) => {
                    let canonical = value.canonical();
                    attribute.replace(AttrValue::Opaque(canonical));
                }
                _ => {}
            }
        }
        violations
    }

    /// Validate a normalized record.
    ///
    /// Does not check article id uniqueness; the parser reports duplicate
    /// ids as a distinct error.
    pub fn validate(&self, record: &StorylineRecord) -> Vec<Violation> {
        let mut violations = self.validate_storyline_fields(record);
        let id = record.id.as_str();

        for (block, attributes) in [
            (REQUIRED_DATA_ELEMENT, &record.required_data_attributes),
            (ARTICLES_ELEMENT, &record.articles_attributes),
        ] {
            violations.extend(
                passthrough_problems(attributes)
                    .into_iter()
                    .map(|(name, problem)| {
                        Violation::new(ElementKind::Storyline, format!("{block}/{name}"), problem)
                            .in_storyline(id)
                    }),
            );
        }

        for (index, object) in record.required_data.iter().enumerate() {
            let locate = |v: Violation| v.in_storyline(id).at_index(index);

            match self
                .registry
                .classify(ElementKind::DataObject, DATA_OBJECT_TYPE_FIELD)
            {
                _ if object.object_type.is_empty() => violations.push(locate(Violation::new(
                    ElementKind::DataObject,
                    DATA_OBJECT_TYPE_FIELD,
                    Problem::Missing,
                ))),
                Classification::Known(spec) => {
                    if let Err(problem) = spec.kind.convert(&object.object_type) {
                        violations.push(locate(Violation::new(
                            ElementKind::DataObject,
                            DATA_OBJECT_TYPE_FIELD,
                            problem,
                        )));
                    }
                }
                Classification::Unknown => {}
            }
            if let Some(problem) = unrepresentable(&object.object_type) {
                violations.push(locate(Violation::new(
                    ElementKind::DataObject,
                    DATA_OBJECT_TYPE_FIELD,
                    problem,
                )));
            }

            violations.extend(
                self.validate_map(ElementKind::DataObject, &object.attributes, DATA_OBJECT_TYPE_FIELD)
                    .into_iter()
                    .map(locate),
            );
        }

        for article in &record.articles {
            let locate = |v: Violation| v.in_storyline(id).in_article(&article.id);
            if article.id.is_empty() {
                violations.push(locate(Violation::new(
                    ElementKind::Article,
                    ID_ATTRIBUTE,
                    Problem::Missing,
                )));
            }
            let texts = [(ID_ATTRIBUTE, Some(article.id.as_str()))]
                .into_iter()
                .chain(article.text_fields());
            for (field, value) in texts {
                if let Some(problem) = value.and_then(unrepresentable) {
                    violations.push(locate(Violation::new(ElementKind::Article, field, problem)));
                }
            }
            violations.extend(
                self.validate_map(ElementKind::Article, &article.attributes, ID_ATTRIBUTE)
                    .into_iter()
                    .map(locate),
            );
        }

        violations
    }

    /// Problems with the storyline's own id and attributes only.
    ///
    /// This is the attribute half of the completeness classification.
    #[must_use]
    pub fn validate_storyline_fields(&self, record: &StorylineRecord) -> Vec<Violation> {
        let mut violations = Vec::new();
        if record.id.is_empty() {
            violations.push(Violation::new(
                ElementKind::Storyline,
                ID_ATTRIBUTE,
                Problem::Missing,
            ));
        }
        if let Some(problem) = unrepresentable(&record.id) {
            violations.push(Violation::new(ElementKind::Storyline, ID_ATTRIBUTE, problem));
        }
        violations.extend(
            self.validate_map(ElementKind::Storyline, &record.attributes, ID_ATTRIBUTE)
                .into_iter()
                .map(|v| v.in_storyline(&record.id)),
        );
        violations
    }

    /// Domain, required-presence and range checks for one attribute map.
    ///
    /// `reserved` is the name carried by the owning record's own field; it
    /// must not also appear in the map and is exempt from the presence check.
    fn validate_map(
        &self,
        kind: ElementKind,
        attributes: &AttributeMap,
        reserved: &str,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for attribute in attributes {
            if attribute.name == reserved {
                violations.push(Violation::new(kind, &attribute.name, Problem::ReservedName));
                continue;
            }
            if let Some(problem) = name_or_value_problem(attribute) {
                violations.push(Violation::new(kind, &attribute.name, problem));
                continue;
            }
            // Opaque values under known names were reported by normalization.
            if let (Classification::Known(spec), AttrValue::Known(value)) =
                (self.registry.classify(kind, &attribute.name), &attribute.value)
            {
                if let Err(problem) = spec.kind.check(value) {
                    violations.push(Violation::new(kind, &attribute.name, problem));
                }
            }
        }

        for spec in self.registry.required_fields(kind) {
            if spec.name != reserved && !attributes.contains(&spec.name) {
                violations.push(Violation::new(kind, &spec.name, Problem::Missing));
            }
        }

        for (min_field, max_field) in self.registry.range_pairs(kind) {
            if let (Some(min), Some(max)) = (attributes.get_int(min_field), attributes.get_int(max_field)) {
                if min > max {
                    violations.push(Violation::new(
                        kind,
                        max_field,
                        Problem::InvertedRange {
                            min_field: min_field.clone(),
                            min,
                            max,
                        },
                    ));
                }
            }
        }

        violations
    }
}

/// The first character of `value` outside the XML 1.0 character range.
fn unrepresentable(value: &str) -> Option<Problem> {
    value
        .chars()
        .find(|&c| {
            matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
        })
        .map(|c| Problem::InvalidCharacter {
            code_point: u32::from(c),
        })
}

/// Whether `name` can be written as an attribute without declaring a
/// namespace. Only the predeclared `xml:` prefix is allowed.
fn is_attribute_name(name: &str) -> bool {
    if name == "xmlns" || name.starts_with("xmlns:") {
        return false;
    }
    let local = name.strip_prefix("xml:").unwrap_or(name);
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn name_or_value_problem(attribute: &Attribute) -> Option<Problem> {
    if !is_attribute_name(&attribute.name) {
        return Some(Problem::InvalidName);
    }
    unrepresentable(&attribute.written())
}

/// Problems in an attribute map that is passed through without a schema.
fn passthrough_problems(attributes: &AttributeMap) -> Vec<(String, Problem)> {
    attributes
        .iter()
        .filter_map(|a| name_or_value_problem(a).map(|p| (a.name.clone(), p)))
        .collect()
}

/// Turn every typed value into its raw text.
fn demote_all(attributes: &mut AttributeMap) {
    for attribute in attributes.iter_mut() {
        if let AttrValue::Known(value) = &attribute.value {
            let canonical = value.canonical();
            attribute.replace(AttrValue::Opaque(canonical));
        }
    }
}
