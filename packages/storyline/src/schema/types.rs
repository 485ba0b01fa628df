//! Value kinds, typed values and field specifications.

use std::fmt;

use serde::Deserialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Problem;

/// Engine literal for `true`.
pub const TRUE_LITERAL: &str = "1";

/// Engine literal for `false`.
pub const FALSE_LITERAL: &str = "0";

/// The three element kinds the registry describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    /// `<STORYLINE>` records.
    Storyline,
    /// `<DATA_OBJECT>` entries inside `<REQUIRED_DATA>`.
    DataObject,
    /// `<ARTICLE>` entries inside `<ARTICLES>`.
    Article,
}

/// Article attribute grouping used by editors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Category {
    /// Direct effects on the game world.
    Modifier,
    /// Conditions for the article to appear.
    Condition,
    /// Injury, retirement and suspension effects.
    Injury,
    /// Everything else (expiry, linked articles).
    Other,
}

/// Whether a field is written as an attribute or as a child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLocation {
    #[default]
    Attribute,
    Child,
}

/// Declared value domain of a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueKind {
    /// Engine boolean, written as `1` or `0`.
    Boolean,
    /// Integer with optional inclusive bounds.
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    /// One of a fixed set of strings.
    Enum { values: Vec<String> },
    /// Free text.
    Text,
}

impl ValueKind {
    /// Human-readable kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer { .. } => "integer",
            Self::Enum { .. } => "enumerated",
            Self::Text => "text",
        }
    }

    /// Convert a raw attribute string into a typed value.
    ///
    /// Only the syntax is checked here; bounds and enumerations are checked
    /// by [`ValueKind::check`]. A value that does not parse is reported
    /// instead of being replaced by a default.
    ///
    /// # Examples
    /// ```
    /// use ootp_storyline::schema::{FieldValue, ValueKind};
    ///
    /// assert_eq!(ValueKind::Boolean.parse("1"), Ok(FieldValue::Bool(true)));
    /// assert!(ValueKind::Boolean.parse("yes").is_err());
    ///
    /// let year = ValueKind::Integer { min: None, max: None };
    /// assert_eq!(year.parse("007"), Ok(FieldValue::Int(7)));
    /// ```
    pub fn parse(&self, raw: &str) -> Result<FieldValue, Problem> {
        match self {
            Self::Boolean => match raw {
                TRUE_LITERAL => Ok(FieldValue::Bool(true)),
                FALSE_LITERAL => Ok(FieldValue::Bool(false)),
                _ => Err(Problem::NotBoolean {
                    value: raw.to_string(),
                }),
            },
            Self::Integer { .. } => raw
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| Problem::NotInteger {
                    value: raw.to_string(),
                }),
            Self::Enum { .. } | Self::Text => Ok(FieldValue::Text(raw.to_string())),
        }
    }

    /// Check a typed value against this domain.
    pub fn check(&self, value: &FieldValue) -> Result<(), Problem> {
        match (self, value) {
            (Self::Boolean, FieldValue::Bool(_)) | (Self::Text, FieldValue::Text(_)) => Ok(()),
            (Self::Integer { min, max }, FieldValue::Int(v)) => {
                if let Some(min) = min.filter(|m| v < m) {
                    return Err(Problem::BelowMinimum { value: *v, min });
                }
                if let Some(max) = max.filter(|m| v > m) {
                    return Err(Problem::AboveMaximum { value: *v, max });
                }
                Ok(())
            }
            (Self::Enum { values }, FieldValue::Text(v)) => {
                if values.iter().any(|allowed| allowed == v) {
                    Ok(())
                } else {
                    Err(Problem::NotInDomain {
                        value: v.clone(),
                        allowed: values.clone(),
                    })
                }
            }
            (kind, value) => Err(Problem::KindMismatch {
                expected: kind.name(),
                found: value.kind_name(),
            }),
        }
    }

    /// Parse and check in one step.
    pub fn convert(&self, raw: &str) -> Result<FieldValue, Problem> {
        let value = self.parse(raw)?;
        self.check(&value)?;
        Ok(value)
    }
}

/// A typed scalar value of a schema-known field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Text(_) => "text",
        }
    }

    /// Canonical string written to the engine file.
    ///
    /// Booleans become `1`/`0`, integers are written without leading zeros.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Bool(true) => TRUE_LITERAL.to_string(),
            Self::Bool(false) => FALSE_LITERAL.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Specification of one recognized field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: ValueKind,
    /// Value used when creating new records.
    pub default: Option<FieldValue>,
    pub required: bool,
    pub category: Option<Category>,
    pub location: FieldLocation,
    /// Short explanation for editors (tooltip text).
    pub description: Option<String>,
}

/// Result of looking a field name up in the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'a> {
    Known(&'a FieldSpec),
    Unknown,
}

impl<'a> Classification<'a> {
    #[must_use]
    pub fn spec(self) -> Option<&'a FieldSpec> {
        match self {
            Self::Known(spec) => Some(spec),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_element_kind_names() {
        assert_eq!(ElementKind::Storyline.to_string(), "STORYLINE");
        assert_eq!(ElementKind::DataObject.to_string(), "DATA_OBJECT");
        assert_eq!(
            ElementKind::from_str("ARTICLE").unwrap(),
            ElementKind::Article
        );
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!(Category::from_str("injury").unwrap(), Category::Injury);
        assert_eq!(Category::Modifier.to_string(), "MODIFIER");
    }

    #[test]
    fn test_boolean_parse_rejects_non_literals() {
        assert_eq!(ValueKind::Boolean.parse("0"), Ok(FieldValue::Bool(false)));
        assert!(matches!(
            ValueKind::Boolean.parse("true"),
            Err(Problem::NotBoolean { .. })
        ));
        assert!(ValueKind::Boolean.parse("").is_err());
    }

    #[test]
    fn test_integer_bounds() {
        let kind = ValueKind::Integer {
            min: Some(0),
            max: Some(10),
        };
        assert_eq!(kind.convert("10"), Ok(FieldValue::Int(10)));
        assert_eq!(
            kind.convert("-1"),
            Err(Problem::BelowMinimum { value: -1, min: 0 })
        );
        assert_eq!(
            kind.convert("11"),
            Err(Problem::AboveMaximum { value: 11, max: 10 })
        );
        assert!(matches!(
            kind.convert("ten"),
            Err(Problem::NotInteger { .. })
        ));
    }

    #[test]
    fn test_enum_domain() {
        let kind = ValueKind::Enum {
            values: vec!["PLAYER".to_string(), "TEAM".to_string()],
        };
        assert!(kind.convert("TEAM").is_ok());
        assert!(matches!(
            kind.convert("player"),
            Err(Problem::NotInDomain { .. })
        ));
    }

    #[test]
    fn test_check_kind_mismatch() {
        assert_eq!(
            ValueKind::Boolean.check(&FieldValue::Int(1)),
            Err(Problem::KindMismatch {
                expected: "boolean",
                found: "integer"
            })
        );
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(FieldValue::Bool(true).canonical(), "1");
        assert_eq!(FieldValue::Bool(false).canonical(), "0");
        assert_eq!(FieldValue::Int(42).canonical(), "42");
        assert_eq!(FieldValue::from("Rookie").canonical(), "Rookie");
    }

    #[test]
    fn test_leading_zeros_dropped() {
        let kind = ValueKind::Integer {
            min: None,
            max: None,
        };
        assert_eq!(kind.parse("0042").unwrap().canonical(), "42");
    }
}
