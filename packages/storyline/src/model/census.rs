//! Survey of the attribute names used across a document.

use std::collections::BTreeMap;

use crate::schema::{ElementKind, SchemaRegistry};

use super::attributes::AttributeMap;
use super::document::DocumentModel;

/// Attribute names seen on one element kind, with occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameCensus {
    pub known: BTreeMap<String, usize>,
    pub unknown: BTreeMap<String, usize>,
}

impl NameCensus {
    fn record(&mut self, kind: ElementKind, attributes: &AttributeMap, registry: &SchemaRegistry) {
        for name in attributes.names() {
            let bucket = if registry.classify(kind, name).is_known() {
                &mut self.known
            } else {
                &mut self.unknown
            };
            *bucket.entry(name.to_string()).or_default() += 1;
        }
    }
}

/// Attribute names used in a document, per element kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeCensus {
    pub storyline: NameCensus,
    pub data_object: NameCensus,
    pub article: NameCensus,
}

impl AttributeCensus {
    /// Walk every record in the model.
    #[must_use]
    pub fn collect(model: &DocumentModel, registry: &SchemaRegistry) -> Self {
        let mut census = Self::default();
        for storyline in model.list() {
            census
                .storyline
                .record(ElementKind::Storyline, &storyline.attributes, registry);
            for object in &storyline.required_data {
                census
                    .data_object
                    .record(ElementKind::DataObject, &object.attributes, registry);
            }
            for article in &storyline.articles {
                census
                    .article
                    .record(ElementKind::Article, &article.attributes, registry);
            }
        }
        census
    }

    #[must_use]
    pub fn for_kind(&self, kind: ElementKind) -> &NameCensus {
        match kind {
            ElementKind::Storyline => &self.storyline,
            ElementKind::DataObject => &self.data_object,
            ElementKind::Article => &self.article,
        }
    }

    /// Total number of unknown attribute names across all kinds.
    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.storyline.unknown.len() + self.data_object.unknown.len() + self.article.unknown.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArticleRecord, DataObject, StorylineRecord};

    #[test]
    fn test_collect_splits_known_and_unknown() {
        let registry = SchemaRegistry::bundled();
        let mut model = DocumentModel::new();

        for id in ["a", "b"] {
            let mut record = StorylineRecord::new(id);
            record.attributes.set_known("random_frequency", 3_i64);
            record.attributes.set_opaque("mod_author", "me");
            let mut object = DataObject::new("PLAYER");
            object.attributes.set_opaque("age_min", "20");
            record.required_data.push(object);
            let mut article = ArticleRecord::new("1");
            article.attributes.set_opaque("legacy_flag", "1");
            record.articles.push(article);
            model.upsert(record, registry).unwrap();
        }

        let census = AttributeCensus::collect(&model, registry);
        assert_eq!(census.storyline.known.get("random_frequency"), Some(&2));
        assert_eq!(census.storyline.unknown.get("mod_author"), Some(&2));
        assert_eq!(census.data_object.known.get("age_min"), Some(&2));
        assert!(census
            .for_kind(ElementKind::Article)
            .unknown
            .contains_key("legacy_flag"));
        assert_eq!(census.unknown_count(), 2);
    }
}
