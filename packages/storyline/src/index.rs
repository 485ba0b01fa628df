//! Text search over the records of a document.
//!
//! The index is a snapshot built from a [`DocumentModel`]; it holds no
//! authoritative state and is rebuilt whenever the model may have changed.

use unicode_normalization::UnicodeNormalization;

use crate::model::{DocumentModel, StorylineRecord};

/// Attribute searched and filtered on as a storyline's category.
pub const CATEGORY_ATTRIBUTE: &str = "category";

/// Searchable text of one record, pre-folded.
#[derive(Debug, Clone)]
struct IndexEntry {
    id: String,
    /// Folded id, article subjects and category.
    haystack: Vec<String>,
    category: Option<String>,
}

impl IndexEntry {
    fn from_record(record: &StorylineRecord) -> Self {
        let category = record
            .attributes
            .get_raw(CATEGORY_ATTRIBUTE)
            .map(|c| fold(&c));

        let mut haystack = vec![fold(&record.id)];
        haystack.extend(
            record
                .articles
                .iter()
                .filter_map(|a| a.subject.as_deref())
                .map(fold),
        );
        haystack.extend(category.clone());

        Self {
            id: record.id.clone(),
            haystack,
            category,
        }
    }
}

/// Search index over a document snapshot, in model list order.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    entries: Vec<IndexEntry>,
}

impl QueryIndex {
    /// Build the index from the current state of a model.
    #[must_use]
    pub fn build(model: &DocumentModel) -> Self {
        Self {
            entries: model.list().iter().map(IndexEntry::from_record).collect(),
        }
    }

    /// Ids of the records matching a query, in model list order.
    ///
    /// Matching is case-insensitive substring search over the id, every
    /// article subject and the `category` attribute. An empty query
    /// matches every record. With a category filter, only records whose
    /// category equals it (ignoring case) are returned.
    ///
    /// # Examples
    /// ```
    /// use ootp_storyline::index::QueryIndex;
    /// use ootp_storyline::parser::parse;
    ///
    /// let model = parse(r#"<STORYLINE_DATABASE><STORYLINES>
    ///     <STORYLINE id="hot_streak" random_frequency="1"/>
    ///     <STORYLINE id="cold_streak" random_frequency="1"/>
    ///     <STORYLINE id="trade_rumor" random_frequency="1"/>
    /// </STORYLINES></STORYLINE_DATABASE>"#).unwrap();
    ///
    /// let index = QueryIndex::build(&model);
    /// assert_eq!(index.search("STREAK", None), vec!["hot_streak", "cold_streak"]);
    /// ```
    #[must_use]
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<String> {
        let needle = fold(query.trim());
        let category = category.map(fold);

        self.entries
            .iter()
            .filter(|entry| match &category {
                Some(wanted) => entry.category.as_ref() == Some(wanted),
                None => true,
            })
            .filter(|entry| needle.is_empty() || entry.haystack.iter().any(|h| h.contains(&needle)))
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// Distinct categories present, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.entries.iter().filter_map(|e| e.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compatibility-normalize and lowercase for comparison.
fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}
