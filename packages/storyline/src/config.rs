//! Configuration constants and validation functions for the storyline editor.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StorylineError};

/// Root element of a storyline database file.
pub const ROOT_ELEMENT: &str = "STORYLINE_DATABASE";

/// Container holding every storyline record.
pub const STORYLINES_ELEMENT: &str = "STORYLINES";

pub const STORYLINE_ELEMENT: &str = "STORYLINE";

pub const REQUIRED_DATA_ELEMENT: &str = "REQUIRED_DATA";

pub const DATA_OBJECT_ELEMENT: &str = "DATA_OBJECT";

pub const ARTICLES_ELEMENT: &str = "ARTICLES";

pub const ARTICLE_ELEMENT: &str = "ARTICLE";

pub const SUBJECT_ELEMENT: &str = "SUBJECT";

pub const TEXT_ELEMENT: &str = "TEXT";

pub const INJURY_DESCRIPTION_ELEMENT: &str = "INJURY_DESCRIPTION";

/// Declaration written at the top of every saved document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// One level of output indentation. The game's own files use tabs.
pub const INDENT: &str = "\t";

/// Root attribute carrying the file version stamp.
pub const FILE_VERSION_ATTRIBUTE: &str = "fileversion";

/// Prefix of the `fileversion` stamp; followed by a local timestamp.
pub const FILE_VERSION_PREFIX: &str = "OOTP Developments";

/// Environment variable pointing to a replacement schema asset.
pub const SCHEMA_PATH_ENV: &str = "STORYLINE_SCHEMA_PATH";

/// Column at which article text is wrapped in terminal output.
pub const TEXT_WRAP_WIDTH: usize = 88;

/// Storyline id pattern: no whitespace, quotes or markup characters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static STORYLINE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[^\s"'<>&]+$"#).expect("valid regex"));

/// Validate a storyline id before it is used for a new record.
///
/// # Arguments
/// * `id` - The storyline identifier to validate
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(StorylineError::InvalidId)` if invalid
///
/// # Examples
/// ```
/// use ootp_storyline::config::validate_storyline_id;
///
/// assert!(validate_storyline_id("rookie_sensation").is_ok());
/// assert!(validate_storyline_id("has space").is_err());
/// assert!(validate_storyline_id("").is_err());
/// ```
pub fn validate_storyline_id(id: &str) -> Result<()> {
    if STORYLINE_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(StorylineError::InvalidId(id.to_string()))
    }
}

/// Format a `fileversion` stamp for the given local time.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use ootp_storyline::config::file_version_stamp;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(9, 5, 0))
///     .unwrap();
/// assert_eq!(file_version_stamp(at), "OOTP Developments 2024-03-01 09:05:00");
/// ```
#[must_use]
pub fn file_version_stamp(at: chrono::NaiveDateTime) -> String {
    format!("{FILE_VERSION_PREFIX} {}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Runtime settings of the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorConfig {
    /// Schema asset to use instead of the bundled one.
    pub schema_path: Option<PathBuf>,
}

impl EditorConfig {
    /// Read settings from the environment.
    ///
    /// An empty `STORYLINE_SCHEMA_PATH` is treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let schema_path = std::env::var(SCHEMA_PATH_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self { schema_path }
    }

    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_storyline_id_valid() {
        assert!(validate_storyline_id("rookie_sensation").is_ok());
        assert!(validate_storyline_id("STORY-0042").is_ok());
        assert!(validate_storyline_id("ñandú").is_ok());
    }

    #[test]
    fn test_validate_storyline_id_invalid() {
        assert!(validate_storyline_id("").is_err());
        assert!(validate_storyline_id("two words").is_err());
        assert!(validate_storyline_id("tab\there").is_err());
        assert!(validate_storyline_id("quote\"d").is_err());
        assert!(validate_storyline_id("<tag>").is_err());
        assert!(validate_storyline_id("a&b").is_err());
    }

    #[test]
    fn test_with_schema_path() {
        let config = EditorConfig::default().with_schema_path("/tmp/schema.yaml");
        assert_eq!(config.schema_path, Some(PathBuf::from("/tmp/schema.yaml")));
    }
}
