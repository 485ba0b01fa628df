//! Error types for the storyline editor core.
//!
//! `StorylineError` is the single error surfaced to library consumers.
//! Field-level problems are carried as structured [`Violation`] values so
//! that a caller can present every problem in a document at once.

use std::fmt;

use thiserror::Error;

use crate::schema::ElementKind;

/// Main error type for the storyline library.
#[derive(Debug, Error)]
pub enum StorylineError {
    /// The input is not well-formed XML.
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    /// A structural element the dialect always carries is missing.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// A modeled element has a namespace in scope. Prefixed names cannot be
    /// carried through an edit, so such documents are refused.
    #[error("Namespaced documents are not supported: {declaration} in scope on <{element}>")]
    UnsupportedNamespace { element: String, declaration: String },

    /// One or more fields in the document fall outside their declared domain.
    #[error("Schema violations ({}):\n{}", .violations.len(), format_violations(.violations))]
    SchemaViolation { violations: Vec<Violation> },

    /// Two sibling records share an id.
    #[error("Duplicate {element} id '{id}'{}", .parent.as_ref().map(|p| format!(" in storyline '{p}'")).unwrap_or_default())]
    DuplicateId {
        element: ElementKind,
        id: String,
        parent: Option<String>,
    },

    /// A candidate record was rejected by `upsert`.
    #[error("Storyline '{id}' rejected ({} problems):\n{}", .violations.len(), format_violations(.violations))]
    Validation {
        id: String,
        violations: Vec<Violation>,
    },

    /// No storyline with the given id exists.
    #[error("Storyline not found: '{id}'")]
    NotFound { id: String },

    /// No article with the given id exists in the storyline.
    #[error("Article '{article}' not found in storyline '{storyline}'")]
    ArticleNotFound { storyline: String, article: String },

    /// The storyline has no data object at this position.
    #[error("Storyline '{storyline}' has no data object #{}", .index + 1)]
    DataObjectNotFound { storyline: String, index: usize },

    /// Save was requested for a document that has never been given a path.
    #[error("No file path set for this document; use save-as")]
    NoDocumentPath,

    /// The schema has no preset with this name.
    #[error("Unknown preset: '{0}'")]
    UnknownPreset(String),

    /// A storyline id that cannot be written as an attribute value.
    #[error("Invalid storyline id: '{0}'. Ids must be non-empty and contain no whitespace, quotes or markup characters")]
    InvalidId(String),

    /// The schema definition asset is unreadable or inconsistent.
    #[error("Invalid schema definition: {0}")]
    SchemaAsset(String),

    /// Schema YAML could not be decoded.
    #[error("Schema YAML parse error: {0}")]
    SchemaYaml(#[from] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storyline operations.
pub type Result<T> = std::result::Result<T, StorylineError>;

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required field is absent or empty.
    Missing,
    /// The raw value is not one of the engine's boolean literals.
    NotBoolean { value: String },
    /// The raw value is not an integer.
    NotInteger { value: String },
    /// Integer below the declared minimum.
    BelowMinimum { value: i64, min: i64 },
    /// Integer above the declared maximum.
    AboveMaximum { value: i64, max: i64 },
    /// Value outside an enumerated domain.
    NotInDomain { value: String, allowed: Vec<String> },
    /// A typed value of the wrong kind was supplied for a known field.
    KindMismatch { expected: &'static str, found: &'static str },
    /// A `(min, max)` field pair where min exceeds max.
    InvertedRange {
        min_field: String,
        min: i64,
        max: i64,
    },
    /// Another sibling already uses this id.
    DuplicateId { id: String },
    /// The name is held by a dedicated record field (`id`, `type`).
    ReservedName,
    /// The name cannot be written as an XML attribute name.
    InvalidName,
    /// The value holds a character XML 1.0 cannot carry.
    InvalidCharacter { code_point: u32 },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "required value is missing"),
            Self::NotBoolean { value } => {
                write!(f, "'{value}' is not a boolean (expected 1 or 0)")
            }
            Self::NotInteger { value } => write!(f, "'{value}' is not an integer"),
            Self::BelowMinimum { value, min } => {
                write!(f, "{value} is below the minimum of {min}")
            }
            Self::AboveMaximum { value, max } => {
                write!(f, "{value} is above the maximum of {max}")
            }
            Self::NotInDomain { value, allowed } => {
                write!(f, "'{value}' is not one of: {}", allowed.join(", "))
            }
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {expected} value, got {found}")
            }
            Self::InvertedRange {
                min_field,
                min,
                max,
            } => write!(f, "{max} is less than {min_field} ({min})"),
            Self::DuplicateId { id } => write!(f, "id '{id}' is used more than once"),
            Self::ReservedName => write!(f, "name is reserved for the record's own field"),
            Self::InvalidName => write!(f, "not a valid XML attribute name"),
            Self::InvalidCharacter { code_point } => {
                write!(f, "contains U+{code_point:04X}, which XML cannot represent")
            }
        }
    }
}

/// A field-level problem located within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Element kind the field belongs to.
    pub element: ElementKind,
    /// Owning storyline, when known.
    pub storyline: Option<String>,
    /// Owning article, for article fields.
    pub article: Option<String>,
    /// Position within `REQUIRED_DATA`, for data object fields.
    pub index: Option<usize>,
    /// Attribute or child name.
    pub field: String,
    pub problem: Problem,
}

impl Violation {
    #[must_use]
    pub fn new(element: ElementKind, field: impl Into<String>, problem: Problem) -> Self {
        Self {
            element,
            storyline: None,
            article: None,
            index: None,
            field: field.into(),
            problem,
        }
    }

    /// Attach the owning storyline id (empty ids are left unset).
    #[must_use]
    pub fn in_storyline(mut self, id: &str) -> Self {
        if !id.is_empty() {
            self.storyline = Some(id.to_string());
        }
        self
    }

    #[must_use]
    pub fn in_article(mut self, id: &str) -> Self {
        if !id.is_empty() {
            self.article = Some(id.to_string());
        }
        self
    }

    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(storyline) = &self.storyline {
            write!(f, "storyline '{storyline}' ")?;
        }
        match (self.element, &self.article, self.index) {
            (ElementKind::Article, Some(article), _) => write!(f, "article '{article}' ")?,
            (ElementKind::DataObject, _, Some(index)) => {
                write!(f, "data object #{} ", index + 1)?;
            }
            (ElementKind::Storyline, _, _) => {}
            (element, _, _) => write!(f, "{element} ")?,
        }
        write!(f, "{}: {}", self.field, self.problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_display() {
        let err = StorylineError::DuplicateId {
            element: ElementKind::Storyline,
            id: "rookie_sensation".to_string(),
            parent: None,
        };
        assert_eq!(err.to_string(), "Duplicate STORYLINE id 'rookie_sensation'");
    }

    #[test]
    fn test_duplicate_article_id_display() {
        let err = StorylineError::DuplicateId {
            element: ElementKind::Article,
            id: "1".to_string(),
            parent: Some("slump".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate ARTICLE id '1' in storyline 'slump'"
        );
    }

    #[test]
    fn test_violation_display_storyline_field() {
        let violation = Violation::new(
            ElementKind::Storyline,
            "league_year_max",
            Problem::InvertedRange {
                min_field: "league_year_min".to_string(),
                min: 2030,
                max: 2020,
            },
        )
        .in_storyline("future_star");

        assert_eq!(
            violation.to_string(),
            "storyline 'future_star' league_year_max: 2020 is less than league_year_min (2030)"
        );
    }

    #[test]
    fn test_violation_display_data_object() {
        let violation = Violation::new(
            ElementKind::DataObject,
            "type",
            Problem::NotInDomain {
                value: "GOAT".to_string(),
                allowed: vec!["PLAYER".to_string(), "TEAM".to_string()],
            },
        )
        .in_storyline("s1")
        .at_index(1);

        assert_eq!(
            violation.to_string(),
            "storyline 's1' data object #2 type: 'GOAT' is not one of: PLAYER, TEAM"
        );
    }

    #[test]
    fn test_schema_violation_lists_every_problem() {
        let err = StorylineError::SchemaViolation {
            violations: vec![
                Violation::new(ElementKind::Storyline, "random_frequency", Problem::Missing),
                Violation::new(
                    ElementKind::Storyline,
                    "only_in_season",
                    Problem::NotBoolean {
                        value: "yes".to_string(),
                    },
                ),
            ],
        };
        let message = err.to_string();
        assert!(message.starts_with("Schema violations (2):"));
        assert!(message.contains("random_frequency: required value is missing"));
        assert!(message.contains("only_in_season: 'yes' is not a boolean"));
    }
}
