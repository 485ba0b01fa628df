//! Storyline document serializer.
//!
//! Writes a [`DocumentModel`] back to the storyline XML dialect. Values are
//! written as they were read until edited; edited known values are written
//! in canonical form. Captured markup is written exactly as read.
//!
//! Element layout: storyline attributes (id first, then source order), then
//! `REQUIRED_DATA`, then `ARTICLES`, then content the parser did not model.

mod writer;

use crate::config::{
    ARTICLES_ELEMENT, ARTICLE_ELEMENT, DATA_OBJECT_ELEMENT, REQUIRED_DATA_ELEMENT,
    STORYLINES_ELEMENT, STORYLINE_ELEMENT, XML_DECLARATION,
};
use crate::model::{
    ArticleRecord, DataObject, DocumentModel, Placement, RawNode, StorylineRecord,
    ID_ATTRIBUTE,
};
use crate::schema::DATA_OBJECT_TYPE_FIELD;

use writer::XmlWriter;

/// Serialize a document model to XML text.
///
/// Pure and total: every model reachable through parsing or `upsert`
/// produces output that parses back to an equal model.
///
/// # Examples
/// ```
/// use ootp_storyline::model::DocumentModel;
/// use ootp_storyline::serializer::serialize;
///
/// let xml = serialize(&DocumentModel::new());
/// assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<STORYLINE_DATABASE fileversion=\"OOTP Developments "));
/// assert!(xml.contains("\t<STORYLINES />\n"));
/// ```
#[must_use]
pub fn serialize(model: &DocumentModel) -> String {
    let mut w = XmlWriter::new();
    w.line(XML_DECLARATION);
    write_raw(&mut w, &model.unrecognized_children, Placement::Prolog);

    w.open(&model.root_name, None, &model.root_attributes);
    if model.is_empty() && !has_raw(&model.unrecognized_children, Placement::Storylines) {
        w.empty(STORYLINES_ELEMENT, None, &model.storylines_attributes);
    } else {
        w.open(STORYLINES_ELEMENT, None, &model.storylines_attributes);
        for record in model.list() {
            write_storyline(&mut w, record);
        }
        write_raw(&mut w, &model.unrecognized_children, Placement::Storylines);
        w.close(STORYLINES_ELEMENT);
    }
    write_raw(&mut w, &model.unrecognized_children, Placement::Root);
    w.close(&model.root_name);

    write_raw(&mut w, &model.unrecognized_children, Placement::Epilog);
    w.finish()
}

fn write_storyline(w: &mut XmlWriter, record: &StorylineRecord) {
    let raw = &record.unrecognized_children;
    let leading = Some((ID_ATTRIBUTE, record.id.as_str()));

    // A captured second block must not become the first one on reload.
    let needs_required_data = !record.required_data.is_empty()
        || !record.required_data_attributes.is_empty()
        || has_raw(raw, Placement::RequiredData)
        || opens_element(raw, REQUIRED_DATA_ELEMENT);
    let needs_articles = !record.articles.is_empty()
        || !record.articles_attributes.is_empty()
        || has_raw(raw, Placement::Articles)
        || opens_element(raw, ARTICLES_ELEMENT);

    if !needs_required_data && !needs_articles && !has_raw(raw, Placement::Storyline) {
        w.empty(STORYLINE_ELEMENT, leading, &record.attributes);
        return;
    }

    w.open(STORYLINE_ELEMENT, leading, &record.attributes);

    if needs_required_data {
        w.open(REQUIRED_DATA_ELEMENT, None, &record.required_data_attributes);
        for object in &record.required_data {
            write_data_object(w, object);
        }
        write_raw(w, raw, Placement::RequiredData);
        w.close(REQUIRED_DATA_ELEMENT);
    }

    if needs_articles {
        w.open(ARTICLES_ELEMENT, None, &record.articles_attributes);
        for article in &record.articles {
            write_article(w, article);
        }
        write_raw(w, raw, Placement::Articles);
        w.close(ARTICLES_ELEMENT);
    }

    write_raw(w, raw, Placement::Storyline);
    w.close(STORYLINE_ELEMENT);
}

fn write_data_object(w: &mut XmlWriter, object: &DataObject) {
    let leading = Some((DATA_OBJECT_TYPE_FIELD, object.object_type.as_str()));
    if object.unrecognized_children.is_empty() {
        w.empty(DATA_OBJECT_ELEMENT, leading, &object.attributes);
    } else {
        w.open(DATA_OBJECT_ELEMENT, leading, &object.attributes);
        write_raw(w, &object.unrecognized_children, Placement::DataObject);
        w.close(DATA_OBJECT_ELEMENT);
    }
}

fn write_article(w: &mut XmlWriter, article: &ArticleRecord) {
    let leading = Some((ID_ATTRIBUTE, article.id.as_str()));
    let fields = article.text_fields();
    if fields.iter().all(|(_, v)| v.is_none()) && article.unrecognized_children.is_empty() {
        w.empty(ARTICLE_ELEMENT, leading, &article.attributes);
        return;
    }

    w.open(ARTICLE_ELEMENT, leading, &article.attributes);
    for (tag, value) in fields {
        if let Some(text) = value {
            w.text_element(tag, text);
        }
    }
    write_raw(w, &article.unrecognized_children, Placement::Article);
    w.close(ARTICLE_ELEMENT);
}

/// Emit the nodes captured in one container.
///
/// Nodes carrying a different placement belong elsewhere and are skipped.
fn write_raw(w: &mut XmlWriter, nodes: &[RawNode], placement: Placement) {
    for node in nodes.iter().filter(|n| n.placement == placement) {
        w.raw(node);
    }
}

fn has_raw(nodes: &[RawNode], placement: Placement) -> bool {
    nodes.iter().any(|n| n.placement == placement)
}

/// Whether a storyline-level raw node is an element named `tag`.
fn opens_element(nodes: &[RawNode], tag: &str) -> bool {
    nodes
        .iter()
        .filter(|n| n.placement == Placement::Storyline)
        .filter_map(|n| n.markup.strip_prefix('<'))
        .filter_map(|rest| rest.strip_prefix(tag))
        .any(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/'))
}
