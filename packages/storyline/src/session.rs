//! Editing session: one open document and the operations a front end calls.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{
    validate_storyline_id, INJURY_DESCRIPTION_ELEMENT, SUBJECT_ELEMENT, TEXT_ELEMENT,
};
use crate::error::{Result, StorylineError};
use crate::index::QueryIndex;
use crate::model::{ArticleRecord, DocumentModel, Readiness, StorylineRecord, UpsertOutcome};
use crate::schema::{ElementKind, SchemaRegistry};
use crate::storage::{load_document, save_document};
use crate::tags::renumber_links;

/// The document being edited, its file and whether it has unsaved changes.
///
/// The session owns its model; nothing else holds a reference to it.
/// Every mutation goes through [`DocumentModel::upsert`] or
/// [`DocumentModel::delete`], so a failed call leaves the model unchanged.
#[derive(Debug)]
pub struct EditingSession<'r> {
    registry: &'r SchemaRegistry,
    model: DocumentModel,
    path: Option<PathBuf>,
    dirty: bool,
}

impl<'r> EditingSession<'r> {
    /// A session on a new, empty document.
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            model: DocumentModel::new(),
            path: None,
            dirty: false,
        }
    }

    /// A session on the document at `path`.
    pub fn open_path(registry: &'r SchemaRegistry, path: &Path) -> Result<Self> {
        let mut session = Self::new(registry);
        session.open(path)?;
        Ok(session)
    }

    /// Replace the current document with the one at `path`.
    ///
    /// On failure the current document stays open.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.model = load_document(path, self.registry)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Write the document back to its file.
    ///
    /// # Errors
    /// `StorylineError::NoDocumentPath` for a document never opened or saved.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.path.clone().ok_or(StorylineError::NoDocumentPath)?;
        save_document(&path, &self.model)?;
        self.dirty = false;
        Ok(path)
    }

    /// Write the document to a new file, which becomes its path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        save_document(path, &self.model)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    #[must_use]
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    #[must_use]
    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the document changed since it was opened or saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn list(&self) -> &[StorylineRecord] {
        self.model.list()
    }

    pub fn get(&self, id: &str) -> Result<&StorylineRecord> {
        self.model.get(id)
    }

    pub fn upsert(&mut self, record: StorylineRecord) -> Result<UpsertOutcome> {
        let outcome = self.model.upsert(record, self.registry)?;
        self.dirty = true;
        Ok(outcome)
    }

    pub fn delete(&mut self, id: &str) -> Result<StorylineRecord> {
        let removed = self.model.delete(id)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn is_complete(&self, id: &str) -> Result<bool> {
        self.model.is_complete(id, self.registry)
    }

    pub fn readiness(&self, id: &str) -> Result<Readiness> {
        self.model.readiness(id, self.registry)
    }

    /// Ids matching a query, in list order. The index is rebuilt per call.
    #[must_use]
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<String> {
        QueryIndex::build(&self.model).search(query, category)
    }

    /// Add a storyline filled with schema defaults and one empty article.
    ///
    /// # Errors
    /// * `InvalidId` when the id cannot be written to the document
    /// * `DuplicateId` when a storyline with this id already exists
    pub fn new_record(&mut self, id: &str) -> Result<&StorylineRecord> {
        validate_storyline_id(id)?;
        if self.model.contains(id) {
            return Err(StorylineError::DuplicateId {
                element: ElementKind::Storyline,
                id: id.to_string(),
                parent: None,
            });
        }
        self.upsert(StorylineRecord::with_defaults(id, self.registry))?;
        info!(id, "Created storyline");
        self.model.get(id)
    }

    /// Apply a named preset to one article.
    pub fn apply_preset(&mut self, storyline: &str, article: &str, preset: &str) -> Result<()> {
        let registry = self.registry;
        let preset = registry
            .preset(preset)
            .ok_or_else(|| StorylineError::UnknownPreset(preset.to_string()))?;
        self.edit_article(storyline, article, |a| a.apply_preset(preset))
    }

    /// Make the data object at `index` the storyline's only main actor.
    pub fn set_main_actor(&mut self, storyline: &str, index: usize) -> Result<()> {
        let mut record = self.model.get(storyline)?.clone();
        if !record.set_main_actor(index) {
            return Err(StorylineError::DataObjectNotFound {
                storyline: storyline.to_string(),
                index,
            });
        }
        self.upsert(record).map(|_| ())
    }

    /// Point every link tag in one article at data object `index`.
    pub fn renumber_links(&mut self, storyline: &str, article: &str, index: usize) -> Result<()> {
        self.edit_article(storyline, article, |a| {
            for tag in [SUBJECT_ELEMENT, TEXT_ELEMENT, INJURY_DESCRIPTION_ELEMENT] {
                if let Some(Some(text)) = a.text_field_mut(tag) {
                    *text = renumber_links(text, index).into_owned();
                }
            }
        })
    }

    fn edit_article(
        &mut self,
        storyline: &str,
        article: &str,
        edit: impl FnOnce(&mut ArticleRecord),
    ) -> Result<()> {
        let mut record = self.model.get(storyline)?.clone();
        let target = record
            .article_mut(article)
            .ok_or_else(|| StorylineError::ArticleNotFound {
                storyline: storyline.to_string(),
                article: article.to_string(),
            })?;
        edit(target);
        self.upsert(record).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataObject;
    use tempfile::tempdir;

    fn registry() -> &'static SchemaRegistry {
        SchemaRegistry::bundled()
    }

    #[test]
    fn test_new_record_and_dirty_flag() {
        let mut session = EditingSession::new(registry());
        assert!(!session.is_dirty());

        let record = session.new_record("hot_streak").unwrap();
        assert_eq!(record.articles.len(), 1);
        assert!(session.is_dirty());
        assert_eq!(session.readiness("hot_streak").unwrap(), Readiness::Draft);
    }

    #[test]
    fn test_new_record_rejects_duplicates_and_bad_ids() {
        let mut session = EditingSession::new(registry());
        session.new_record("a").unwrap();
        assert!(matches!(
            session.new_record("a"),
            Err(StorylineError::DuplicateId { .. })
        ));
        assert!(matches!(
            session.new_record("bad id"),
            Err(StorylineError::InvalidId(_))
        ));
        assert_eq!(session.list().len(), 1);
    }

    #[test]
    fn test_save_without_path() {
        let mut session = EditingSession::new(registry());
        assert!(matches!(session.save(), Err(StorylineError::NoDocumentPath)));
    }

    #[test]
    fn test_save_as_then_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.xml");

        let mut session = EditingSession::new(registry());
        session.new_record("a").unwrap();
        session.save_as(&path).unwrap();
        assert!(!session.is_dirty());
        assert_eq!(session.path(), Some(path.as_path()));

        let reopened = EditingSession::open_path(registry(), &path).unwrap();
        assert_eq!(reopened.model(), session.model());
    }

    #[test]
    fn test_open_discards_previous_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.xml");
        let mut other = EditingSession::new(registry());
        other.new_record("from_file").unwrap();
        other.save_as(&path).unwrap();

        let mut session = EditingSession::new(registry());
        session.new_record("unsaved").unwrap();
        session.open(&path).unwrap();
        assert_eq!(session.model().ids().collect::<Vec<_>>(), vec!["from_file"]);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_apply_preset() {
        let mut session = EditingSession::new(registry());
        session.new_record("a").unwrap();
        session.apply_preset("a", "1", "minor_injury").unwrap();

        let article = &session.get("a").unwrap().articles[0];
        assert_eq!(article.attributes.get_bool("injury"), Some(true));
        assert_eq!(article.attributes.get_int("injury_length_days"), Some(14));

        assert!(matches!(
            session.apply_preset("a", "1", "nope"),
            Err(StorylineError::UnknownPreset(_))
        ));
        assert!(matches!(
            session.apply_preset("a", "9", "minor_injury"),
            Err(StorylineError::ArticleNotFound { .. })
        ));
    }

    #[test]
    fn test_set_main_actor() {
        let mut session = EditingSession::new(registry());
        let mut record = StorylineRecord::with_defaults("a", registry());
        record.required_data.push(DataObject::new("PLAYER"));
        record.required_data.push(DataObject::new("TEAM"));
        session.upsert(record).unwrap();

        session.set_main_actor("a", 1).unwrap();
        assert_eq!(
            session.get("a").unwrap().main_actor().map(|(i, _)| i),
            Some(1)
        );
        assert!(matches!(
            session.set_main_actor("a", 5),
            Err(StorylineError::DataObjectNotFound { index: 5, .. })
        ));
    }

    #[test]
    fn test_renumber_links() {
        let mut session = EditingSession::new(registry());
        let mut record = StorylineRecord::with_defaults("a", registry());
        record.articles[0].text = Some("[%personlink#1 f l] meets [%teamlink#3]".to_string());
        session.upsert(record).unwrap();

        session.renumber_links("a", "1", 2).unwrap();
        assert_eq!(
            session.get("a").unwrap().articles[0].text.as_deref(),
            Some("[%personlink#2 f l] meets [%teamlink#2]")
        );
    }

    #[test]
    fn test_delete_removes_from_search() {
        let mut session = EditingSession::new(registry());
        session.new_record("X").unwrap();
        session.new_record("Y").unwrap();
        session.delete("X").unwrap();
        assert!(matches!(session.delete("X"), Err(StorylineError::NotFound { .. })));
        assert_eq!(session.search("", None), vec!["Y"]);
    }
}
