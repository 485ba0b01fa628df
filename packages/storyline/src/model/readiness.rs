//! Derived editorial readiness of a storyline.

use strum::{AsRefStr, Display};

use crate::error::Violation;
use crate::schema::SchemaRegistry;

use super::types::StorylineRecord;
use super::validation::RecordValidator;

/// How far a storyline is from being usable in game.
///
/// Always computed from the current record; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Readiness {
    /// At least one article has subject and text, and the storyline's own
    /// required attributes are present and in domain.
    Complete,
    /// Has articles but is not complete.
    Draft,
    /// Has no articles at all.
    Empty,
}

impl Readiness {
    /// Classify a record.
    #[must_use]
    pub fn of(record: &StorylineRecord, registry: &SchemaRegistry) -> Self {
        if record.articles.is_empty() {
            return Self::Empty;
        }
        let has_content = record.articles.iter().any(|a| a.has_content());
        if has_content && blocking_problems(record, registry).is_empty() {
            Self::Complete
        } else {
            Self::Draft
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// Attribute problems that keep a storyline from being complete.
#[must_use]
pub fn blocking_problems(record: &StorylineRecord, registry: &SchemaRegistry) -> Vec<Violation> {
    let mut record = record.clone();
    let mut problems = RecordValidator::new(registry).normalize(&mut record);
    problems.retain(|v| v.article.is_none() && v.index.is_none());
    problems.extend(RecordValidator::new(registry).validate_storyline_fields(&record));
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleRecord;

    fn registry() -> &'static SchemaRegistry {
        SchemaRegistry::bundled()
    }

    fn rookie_sensation() -> StorylineRecord {
        let mut record = StorylineRecord::new("rookie_sensation");
        record.attributes.set_known("random_frequency", 10_i64);
        record.articles.push(
            ArticleRecord::new("1")
                .with_subject("Rookie Sensation")
                .with_text("..."),
        );
        record
    }

    #[test]
    fn test_complete() {
        assert_eq!(Readiness::of(&rookie_sensation(), registry()), Readiness::Complete);
    }

    #[test]
    fn test_removing_text_makes_draft() {
        let mut record = rookie_sensation();
        record.articles[0].text = None;
        assert_eq!(Readiness::of(&record, registry()), Readiness::Draft);
    }

    #[test]
    fn test_missing_required_attribute_makes_draft() {
        let mut record = rookie_sensation();
        record.attributes.remove("random_frequency");
        assert_eq!(Readiness::of(&record, registry()), Readiness::Draft);
    }

    #[test]
    fn test_unparseable_required_attribute_makes_draft() {
        let mut record = rookie_sensation();
        record.attributes.set_opaque("random_frequency", "often");
        assert!(!Readiness::of(&record, registry()).is_complete());
    }

    #[test]
    fn test_no_articles_is_empty() {
        let mut record = rookie_sensation();
        record.articles.clear();
        assert_eq!(Readiness::of(&record, registry()), Readiness::Empty);
    }

    #[test]
    fn test_any_article_with_content_suffices() {
        let mut record = rookie_sensation();
        record.articles.insert(0, ArticleRecord::new("0"));
        assert!(Readiness::of(&record, registry()).is_complete());
    }

    #[test]
    fn test_display() {
        assert_eq!(Readiness::Draft.to_string(), "draft");
    }
}
