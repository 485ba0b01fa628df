//! Storyline records and their owned entries.

use crate::config::{INJURY_DESCRIPTION_ELEMENT, SUBJECT_ELEMENT, TEXT_ELEMENT};
use crate::schema::{ElementKind, FieldLocation, Preset, SchemaRegistry};

use super::attributes::{AttrValue, AttributeMap};

/// Attribute marking the data object a storyline is about.
pub const MAIN_ACTOR_ATTRIBUTE: &str = "main_actor";

/// Container a piece of unmodelled content was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Before the root element (comments, processing instructions).
    Prolog,
    /// Directly under the document root element.
    Root,
    /// Inside `<STORYLINES>`, between storyline records.
    Storylines,
    /// Directly inside a `<STORYLINE>`.
    Storyline,
    /// Inside `<REQUIRED_DATA>`.
    RequiredData,
    /// Inside a `<DATA_OBJECT>`.
    DataObject,
    /// Inside `<ARTICLES>`.
    Articles,
    /// Inside an `<ARTICLE>`.
    Article,
    /// After the root element.
    Epilog,
}

/// Content the parser did not model, kept as its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub placement: Placement,
    /// Verbatim markup: an element, comment, processing instruction or text.
    pub markup: String,
}

impl RawNode {
    #[must_use]
    pub fn new(placement: Placement, markup: impl Into<String>) -> Self {
        Self {
            placement,
            markup: markup.into(),
        }
    }
}

/// A `<DATA_OBJECT>`: a game entity that must exist for a storyline to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataObject {
    /// Entity kind, e.g. `PLAYER` or `TEAM`.
    pub object_type: String,
    /// Type-specific constraints, known or opaque.
    pub attributes: AttributeMap,
    pub unrecognized_children: Vec<RawNode>,
}

impl DataObject {
    #[must_use]
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            attributes: AttributeMap::new(),
            unrecognized_children: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_main_actor(&self) -> bool {
        self.attributes.get_bool(MAIN_ACTOR_ATTRIBUTE).unwrap_or(false)
    }
}

/// An `<ARTICLE>`: one piece of news text attached to a storyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: String,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub injury_description: Option<String>,
    pub attributes: AttributeMap,
    pub unrecognized_children: Vec<RawNode>,
}

impl ArticleRecord {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: None,
            text: None,
            injury_description: None,
            attributes: AttributeMap::new(),
            unrecognized_children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Text child fields with their element names, in output order.
    #[must_use]
    pub fn text_fields(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (SUBJECT_ELEMENT, self.subject.as_deref()),
            (TEXT_ELEMENT, self.text.as_deref()),
            (INJURY_DESCRIPTION_ELEMENT, self.injury_description.as_deref()),
        ]
    }

    /// Slot holding the text of a child element, by element name.
    pub fn text_field_mut(&mut self, tag: &str) -> Option<&mut Option<String>> {
        match tag {
            SUBJECT_ELEMENT => Some(&mut self.subject),
            TEXT_ELEMENT => Some(&mut self.text),
            INJURY_DESCRIPTION_ELEMENT => Some(&mut self.injury_description),
            _ => None,
        }
    }

    /// Both subject and text carry non-blank content.
    ///
    /// Whitespace-only text counts as empty: the engine shows nothing for it.
    #[must_use]
    pub fn has_content(&self) -> bool {
        let filled = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.subject) && filled(&self.text)
    }

    /// Copy every value of a preset into this article's attributes.
    pub fn apply_preset(&mut self, preset: &Preset) {
        for (name, value) in &preset.values {
            self.attributes.set(name.clone(), AttrValue::Known(value.clone()));
        }
    }
}

/// When in the baseball calendar a storyline may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonWindow {
    InSeason,
    Offseason,
    SpringTraining,
    AnyTime,
}

/// A `<STORYLINE>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorylineRecord {
    pub id: String,
    pub attributes: AttributeMap,
    /// Order is meaningful to the engine.
    pub required_data: Vec<DataObject>,
    /// Order is the in-game presentation order.
    pub articles: Vec<ArticleRecord>,
    /// Attributes written on the `<REQUIRED_DATA>` block itself.
    pub required_data_attributes: AttributeMap,
    /// Attributes written on the `<ARTICLES>` block itself.
    pub articles_attributes: AttributeMap,
    pub unrecognized_children: Vec<RawNode>,
}

impl StorylineRecord {
    /// An empty record with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: AttributeMap::new(),
            required_data: Vec::new(),
            articles: Vec::new(),
            required_data_attributes: AttributeMap::new(),
            articles_attributes: AttributeMap::new(),
            unrecognized_children: Vec::new(),
        }
    }

    /// A new record as created by the editor's "new storyline" command.
    ///
    /// Every storyline attribute with a schema default is filled in, and a
    /// single empty article with id `1` is added.
    #[must_use]
    pub fn with_defaults(id: impl Into<String>, registry: &SchemaRegistry) -> Self {
        let mut record = Self::new(id);
        for spec in registry.fields(ElementKind::Storyline) {
            if spec.location != FieldLocation::Attribute || spec.name == "id" {
                continue;
            }
            if let Some(default) = &spec.default {
                record.attributes.set_known(spec.name.clone(), default.clone());
            }
        }
        record.articles.push(ArticleRecord::new("1"));
        record
    }

    /// Display title: the first article's subject, falling back to the id.
    #[must_use]
    pub fn title(&self) -> &str {
        self.articles
            .first()
            .and_then(|a| a.subject.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    #[must_use]
    pub fn article(&self, id: &str) -> Option<&ArticleRecord> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn article_mut(&mut self, id: &str) -> Option<&mut ArticleRecord> {
        self.articles.iter_mut().find(|a| a.id == id)
    }

    /// Derived from the season flags; the first set flag wins.
    #[must_use]
    pub fn season_window(&self) -> SeasonWindow {
        let flag = |name| self.attributes.get_bool(name).unwrap_or(false);
        if flag("only_in_season") {
            SeasonWindow::InSeason
        } else if flag("only_in_offseason") {
            SeasonWindow::Offseason
        } else if flag("only_in_spring") {
            SeasonWindow::SpringTraining
        } else {
            SeasonWindow::AnyTime
        }
    }

    /// Make the data object at `index` the only main actor.
    ///
    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn set_main_actor(&mut self, index: usize) -> bool {
        if index >= self.required_data.len() {
            return false;
        }
        for object in &mut self.required_data {
            object.attributes.remove(MAIN_ACTOR_ATTRIBUTE);
        }
        self.required_data[index]
            .attributes
            .set_known(MAIN_ACTOR_ATTRIBUTE, true);
        true
    }

    /// Position and entry of the main actor, if one is marked.
    #[must_use]
    pub fn main_actor(&self) -> Option<(usize, &DataObject)> {
        self.required_data
            .iter()
            .enumerate()
            .find(|(_, object)| object.is_main_actor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldValue;

    #[test]
    fn test_with_defaults() {
        let registry = SchemaRegistry::bundled();
        let record = StorylineRecord::with_defaults("new_story", registry);

        assert_eq!(record.id, "new_story");
        assert_eq!(record.attributes.get_int("random_frequency"), Some(10));
        assert!(!record.attributes.contains("id"));
        assert_eq!(record.articles.len(), 1);
        assert_eq!(record.articles[0].id, "1");
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let mut record = StorylineRecord::new("slump");
        assert_eq!(record.title(), "slump");

        record
            .articles
            .push(ArticleRecord::new("1").with_subject("Batting Slump"));
        assert_eq!(record.title(), "Batting Slump");
    }

    #[test]
    fn test_has_content_requires_both() {
        let article = ArticleRecord::new("1").with_subject("Rookie Sensation");
        assert!(!article.has_content());
        assert!(article.with_text("...").has_content());
        assert!(!ArticleRecord::new("2")
            .with_subject("x")
            .with_text("   ")
            .has_content());
    }

    #[test]
    fn test_text_field_slots() {
        let mut article = ArticleRecord::new("1");
        *article.text_field_mut("INJURY_DESCRIPTION").unwrap() = Some("sprained ankle".into());
        assert!(article.text_field_mut("HEADLINE").is_none());
        assert_eq!(
            article.text_fields()[2],
            ("INJURY_DESCRIPTION", Some("sprained ankle"))
        );
    }

    #[test]
    fn test_season_window_priority() {
        let mut record = StorylineRecord::new("s");
        assert_eq!(record.season_window(), SeasonWindow::AnyTime);

        record.attributes.set_known("only_in_spring", true);
        assert_eq!(record.season_window(), SeasonWindow::SpringTraining);

        record.attributes.set_known("only_in_season", true);
        assert_eq!(record.season_window(), SeasonWindow::InSeason);
    }

    #[test]
    fn test_set_main_actor_is_exclusive() {
        let mut record = StorylineRecord::new("s");
        record.required_data.push(DataObject::new("PLAYER"));
        record.required_data.push(DataObject::new("TEAM"));

        assert!(record.set_main_actor(0));
        assert!(record.set_main_actor(1));
        assert_eq!(record.main_actor().map(|(i, _)| i), Some(1));
        assert!(!record.required_data[0].is_main_actor());
        assert!(!record.required_data[0].attributes.contains(MAIN_ACTOR_ATTRIBUTE));
    }

    #[test]
    fn test_set_main_actor_out_of_range() {
        let mut record = StorylineRecord::new("s");
        record.required_data.push(DataObject::new("PLAYER"));
        assert!(!record.set_main_actor(3));
        assert!(record.main_actor().is_none());
    }

    #[test]
    fn test_apply_preset() {
        let registry = SchemaRegistry::bundled();
        let mut article = ArticleRecord::new("1");
        article.attributes.set_opaque("custom", "keep");
        article.apply_preset(registry.preset("minor_injury").unwrap());

        assert_eq!(article.attributes.get_bool("injury"), Some(true));
        assert_eq!(
            article.attributes.get("injury_length_days"),
            Some(&AttrValue::Known(FieldValue::Int(14)))
        );
        assert_eq!(article.attributes.get_raw("custom").as_deref(), Some("keep"));
    }
}
