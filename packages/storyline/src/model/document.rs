//! The record set of one open document and its accessor contract.

use tracing::debug;

use crate::config::{file_version_stamp, FILE_VERSION_ATTRIBUTE, ROOT_ELEMENT};
use crate::error::{Result, StorylineError};
use crate::schema::SchemaRegistry;

use super::attributes::AttributeMap;
use super::readiness::Readiness;
use super::types::{RawNode, StorylineRecord};
use super::validation::RecordValidator;

/// What `upsert` did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Appended as a new record.
    Inserted,
    /// Replaced the record at this position.
    Replaced(usize),
}

/// An open storyline document.
///
/// Records are kept in load order. Every record reachable through this type
/// has passed [`RecordValidator`], which is what keeps serialization total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentModel {
    /// Tag name of the root element, kept as read.
    pub root_name: String,
    /// Root attributes such as `fileversion`, passed through as written.
    pub root_attributes: AttributeMap,
    /// Attributes of the `<STORYLINES>` container, passed through as written.
    pub storylines_attributes: AttributeMap,
    storylines: Vec<StorylineRecord>,
    /// Content under the root or `STORYLINES` that is not a storyline.
    pub unrecognized_children: Vec<RawNode>,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel {
    /// An empty document stamped with the current local time.
    #[must_use]
    pub fn new() -> Self {
        let mut root_attributes = AttributeMap::new();
        root_attributes.set_opaque(
            FILE_VERSION_ATTRIBUTE,
            file_version_stamp(chrono::Local::now().naive_local()),
        );
        Self {
            root_name: ROOT_ELEMENT.to_string(),
            root_attributes,
            storylines_attributes: AttributeMap::new(),
            storylines: Vec::new(),
            unrecognized_children: Vec::new(),
        }
    }

    /// Assemble a model from already validated parts.
    pub(crate) fn from_parts(
        root_name: String,
        root_attributes: AttributeMap,
        storylines_attributes: AttributeMap,
        storylines: Vec<StorylineRecord>,
        unrecognized_children: Vec<RawNode>,
    ) -> Self {
        Self {
            root_name,
            root_attributes,
            storylines_attributes,
            storylines,
            unrecognized_children,
        }
    }

    /// All records in load order.
    #[must_use]
    pub fn list(&self) -> &[StorylineRecord] {
        &self.storylines
    }

    /// Record ids in load order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.storylines.iter().map(|s| s.id.as_str())
    }

    /// Look up a record by id.
    ///
    /// # Errors
    /// `StorylineError::NotFound` when no record has this id.
    pub fn get(&self, id: &str) -> Result<&StorylineRecord> {
        self.storylines
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StorylineError::NotFound { id: id.to_string() })
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.storylines.iter().position(|s| s.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.storylines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storylines.is_empty()
    }

    /// Insert a record, or replace the one with the same id in place.
    ///
    /// The record is normalized and validated first. On failure the model
    /// is left exactly as it was.
    ///
    /// # Arguments
    /// * `record` - Candidate record
    /// * `registry` - Schema the record is checked against
    ///
    /// # Returns
    /// Whether the record was inserted or replaced an existing one.
    ///
    /// # Errors
    /// `StorylineError::Validation` listing every problem with the record.
    pub fn upsert(
        &mut self,
        record: StorylineRecord,
        registry: &SchemaRegistry,
    ) -> Result<UpsertOutcome> {
        let id = record.id.clone();
        let record = RecordValidator::new(registry)
            .check(record)
            .map_err(|violations| StorylineError::Validation {
                id: id.clone(),
                violations,
            })?;

        match self.position(&id) {
            Some(index) => {
                debug!(id = %id, index, "Replacing storyline");
                self.storylines[index] = record;
                Ok(UpsertOutcome::Replaced(index))
            }
            None => {
                debug!(id = %id, "Inserting storyline");
                self.storylines.push(record);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Remove a record with its articles and data objects.
    ///
    /// # Errors
    /// `StorylineError::NotFound` when no record has this id, including
    /// when it was already deleted.
    pub fn delete(&mut self, id: &str) -> Result<StorylineRecord> {
        let index = self
            .position(id)
            .ok_or_else(|| StorylineError::NotFound { id: id.to_string() })?;
        debug!(id = %id, "Deleting storyline");
        Ok(self.storylines.remove(index))
    }

    /// Editorial readiness of a record, recomputed on every call.
    ///
    /// # Errors
    /// `StorylineError::NotFound` when no record has this id.
    pub fn readiness(&self, id: &str, registry: &SchemaRegistry) -> Result<Readiness> {
        Ok(Readiness::of(self.get(id)?, registry))
    }

    /// Whether a record is ready to ship.
    ///
    /// # Errors
    /// `StorylineError::NotFound` when no record has this id.
    pub fn is_complete(&self, id: &str, registry: &SchemaRegistry) -> Result<bool> {
        Ok(self.readiness(id, registry)?.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Problem;
    use crate::model::ArticleRecord;

    fn record(id: &str) -> StorylineRecord {
        let mut record = StorylineRecord::new(id);
        record.attributes.set_known("random_frequency", 10_i64);
        record
            .articles
            .push(ArticleRecord::new("1").with_subject("Subject").with_text("Text"));
        record
    }

    fn model_with(ids: &[&str]) -> DocumentModel {
        let registry = SchemaRegistry::bundled();
        let mut model = DocumentModel::new();
        for id in ids {
            model.upsert(record(id), registry).unwrap();
        }
        model
    }

    #[test]
    fn test_new_document_is_stamped() {
        let model = DocumentModel::new();
        assert_eq!(model.root_name, "STORYLINE_DATABASE");
        let stamp = model.root_attributes.get_raw("fileversion").unwrap();
        assert!(stamp.starts_with("OOTP Developments "));
        assert!(model.is_empty());
    }

    #[test]
    fn test_upsert_inserts_then_replaces_in_place() {
        let registry = SchemaRegistry::bundled();
        let mut model = model_with(&["a", "b", "c"]);

        let mut changed = record("b");
        changed.attributes.set_known("only_in_season", true);
        let outcome = model.upsert(changed, registry).unwrap();

        assert_eq!(outcome, UpsertOutcome::Replaced(1));
        assert_eq!(model.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(
            model.get("b").unwrap().attributes.get_bool("only_in_season"),
            Some(true)
        );
    }

    #[test]
    fn test_rejected_upsert_leaves_model_unchanged() {
        let registry = SchemaRegistry::bundled();
        let mut model = model_with(&["a"]);
        let before = model.clone();

        let mut bad = record("a");
        bad.attributes.set_known("league_year_min", 2030_i64);
        bad.attributes.set_known("league_year_max", 2020_i64);
        bad.attributes.remove("random_frequency");

        match model.upsert(bad, registry) {
            Err(StorylineError::Validation { id, violations }) => {
                assert_eq!(id, "a");
                assert_eq!(violations.len(), 2);
                assert!(violations
                    .iter()
                    .any(|v| matches!(v.problem, Problem::InvertedRange { .. })));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(model, before);
    }

    #[test]
    fn test_delete_twice() {
        let mut model = model_with(&["X", "Y"]);
        assert_eq!(model.delete("X").unwrap().id, "X");
        assert!(matches!(
            model.delete("X"),
            Err(StorylineError::NotFound { id }) if id == "X"
        ));
        assert_eq!(model.ids().collect::<Vec<_>>(), vec!["Y"]);
    }

    #[test]
    fn test_get_missing() {
        let model = model_with(&["a"]);
        assert!(matches!(model.get("zzz"), Err(StorylineError::NotFound { .. })));
        assert!(matches!(
            model.is_complete("zzz", SchemaRegistry::bundled()),
            Err(StorylineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_is_complete_tracks_edits() {
        let registry = SchemaRegistry::bundled();
        let mut model = model_with(&["a"]);
        assert!(model.is_complete("a", registry).unwrap());

        let mut edited = model.get("a").unwrap().clone();
        edited.articles[0].text = None;
        model.upsert(edited, registry).unwrap();
        assert!(!model.is_complete("a", registry).unwrap());
        assert_eq!(model.readiness("a", registry).unwrap(), Readiness::Draft);
    }
}
