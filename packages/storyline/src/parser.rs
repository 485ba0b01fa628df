//! Storyline database parser.
//!
//! Walks the XML tree once and builds a [`DocumentModel`]. Modeled content
//! becomes records; everything else is kept as [`RawNode`] source slices so
//! it can be written back unchanged.

use std::collections::HashSet;

use roxmltree::{Document, Node, NS_XML_URI};
use tracing::{debug, warn};

use crate::config::{
    ARTICLES_ELEMENT, ARTICLE_ELEMENT, DATA_OBJECT_ELEMENT, REQUIRED_DATA_ELEMENT,
    STORYLINES_ELEMENT, STORYLINE_ELEMENT,
};
use crate::error::{Result, StorylineError, Violation};
use crate::model::{
    AttrValue, AttributeMap, ArticleRecord, DataObject, DocumentModel, Placement, RawNode,
    RecordValidator, StorylineRecord, ID_ATTRIBUTE,
};
use crate::schema::{ElementKind, SchemaRegistry, DATA_OBJECT_TYPE_FIELD};
use crate::xml::{get_tag_name, has_tag, is_blank_text, source_markup, text_content};

/// Parse a storyline document against the bundled schema.
///
/// # Arguments
/// * `xml` - Full document text
///
/// # Returns
/// The document model, or the first fatal error. Schema violations are
/// collected across the whole document and reported together.
///
/// # Examples
/// ```
/// let xml = r#"<STORYLINE_DATABASE>
///     <STORYLINES>
///         <STORYLINE id="slump" random_frequency="4"/>
///     </STORYLINES>
/// </STORYLINE_DATABASE>"#;
///
/// let model = ootp_storyline::parser::parse(xml).unwrap();
/// assert_eq!(model.get("slump").unwrap().attributes.get_int("random_frequency"), Some(4));
/// ```
pub fn parse(xml: &str) -> Result<DocumentModel> {
    DocumentParser::new(SchemaRegistry::bundled()).parse(xml)
}

/// Parser bound to a schema registry.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParser<'r> {
    registry: &'r SchemaRegistry,
}

/// State collected during one parse.
#[derive(Default)]
struct ParseContext {
    violations: Vec<Violation>,
    fatal: Option<StorylineError>,
    raw_nodes: usize,
}

impl ParseContext {
    fn note_fatal(&mut self, err: StorylineError) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
    }

    fn note_duplicate(&mut self, element: ElementKind, id: &str, parent: Option<&str>) {
        self.note_fatal(StorylineError::DuplicateId {
            element,
            id: id.to_string(),
            parent: parent.map(str::to_string),
        });
    }

    /// Record a modeled element that has a namespace in scope.
    fn check_namespaces(&mut self, node: Node<'_, '_>) {
        if let Err(err) = reject_namespaces(node) {
            self.note_fatal(err);
        }
    }

    /// Keep a node verbatim unless it is insignificant whitespace.
    ///
    /// Stray text is trimmed; the surrounding whitespace is layout.
    fn keep_raw(
        &mut self,
        node: Node<'_, '_>,
        source: &str,
        placement: Placement,
        into: &mut Vec<RawNode>,
    ) {
        if is_blank_text(node) {
            return;
        }
        let markup = source_markup(node, source);
        let markup = if node.is_text() { markup.trim() } else { markup };
        self.raw_nodes += 1;
        into.push(RawNode::new(placement, markup));
    }
}

impl<'r> DocumentParser<'r> {
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Parse a storyline document.
    ///
    /// # Errors
    /// * `MalformedXml` when the text is not well-formed XML
    /// * `MissingElement` when the root has no `STORYLINES` container
    /// * `UnsupportedNamespace` when a modeled element has a namespace in scope
    /// * `DuplicateId` when two storylines, or two articles of one storyline,
    ///   share an id
    /// * `SchemaViolation` with every field-level problem in the document
    pub fn parse(&self, xml: &str) -> Result<DocumentModel> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        reject_namespaces(root)?;
        let mut ctx = ParseContext::default();
        let mut unrecognized = Vec::new();
        let mut epilog = Vec::new();

        let mut before_root = true;
        for node in doc.root().children() {
            if node.id() == root.id() {
                before_root = false;
            } else if before_root {
                ctx.keep_raw(node, xml, Placement::Prolog, &mut unrecognized);
            } else {
                ctx.keep_raw(node, xml, Placement::Epilog, &mut epilog);
            }
        }

        let mut container = None;
        for node in root.children() {
            if container.is_none() && has_tag(node, STORYLINES_ELEMENT) {
                container = Some(node);
            } else {
                ctx.keep_raw(node, xml, Placement::Root, &mut unrecognized);
            }
        }
        let container = container.ok_or_else(|| StorylineError::MissingElement {
            element: STORYLINES_ELEMENT.to_string(),
            context: get_tag_name(root).to_string(),
        })?;
        ctx.check_namespaces(container);

        let mut storylines = Vec::new();
        let mut seen = HashSet::new();
        for node in container.children() {
            if has_tag(node, STORYLINE_ELEMENT) {
                let record = self.parse_storyline(node, xml, &mut ctx);
                if !record.id.is_empty() && !seen.insert(record.id.clone()) {
                    ctx.note_duplicate(ElementKind::Storyline, &record.id, None);
                }
                storylines.push(record);
            } else {
                ctx.keep_raw(node, xml, Placement::Storylines, &mut unrecognized);
            }
        }
        unrecognized.extend(epilog);

        if let Some(err) = ctx.fatal {
            return Err(err);
        }

        let validator = RecordValidator::new(self.registry);
        for record in &mut storylines {
            ctx.violations.extend(validator.normalize(record));
            ctx.violations.extend(validator.validate(record));
        }
        if !ctx.violations.is_empty() {
            warn!(count = ctx.violations.len(), "Document has schema violations");
            return Err(StorylineError::SchemaViolation {
                violations: ctx.violations,
            });
        }

        debug!(
            storylines = storylines.len(),
            raw_nodes = ctx.raw_nodes,
            "Parsed storyline document"
        );

        Ok(DocumentModel::from_parts(
            get_tag_name(root).to_string(),
            opaque_attributes(root),
            opaque_attributes(container),
            storylines,
            unrecognized,
        ))
    }

    fn parse_storyline(&self, node: Node<'_, '_>, source: &str, ctx: &mut ParseContext) -> StorylineRecord {
        ctx.check_namespaces(node);
        let mut record = StorylineRecord::new(node.attribute(ID_ATTRIBUTE).unwrap_or_default());
        record.attributes = opaque_attributes_except(node, ID_ATTRIBUTE);

        let mut required_data = None;
        let mut articles = None;
        for child in node.children() {
            if required_data.is_none() && has_tag(child, REQUIRED_DATA_ELEMENT) {
                required_data = Some(child);
            } else if articles.is_none() && has_tag(child, ARTICLES_ELEMENT) {
                articles = Some(child);
            } else {
                ctx.keep_raw(child, source, Placement::Storyline, &mut record.unrecognized_children);
            }
        }

        if let Some(block) = required_data {
            ctx.check_namespaces(block);
            record.required_data_attributes = opaque_attributes(block);
            for child in block.children() {
                if has_tag(child, DATA_OBJECT_ELEMENT) {
                    record.required_data.push(parse_data_object(child, source, ctx));
                } else {
                    ctx.keep_raw(child, source, Placement::RequiredData, &mut record.unrecognized_children);
                }
            }
        }

        if let Some(block) = articles {
            ctx.check_namespaces(block);
            record.articles_attributes = opaque_attributes(block);
            let mut seen = HashSet::new();
            for child in block.children() {
                if has_tag(child, ARTICLE_ELEMENT) {
                    let article = self.parse_article(child, source, ctx);
                    if !article.id.is_empty() && !seen.insert(article.id.clone()) {
                        ctx.note_duplicate(ElementKind::Article, &article.id, Some(&record.id));
                    }
                    record.articles.push(article);
                } else {
                    ctx.keep_raw(child, source, Placement::Articles, &mut record.unrecognized_children);
                }
            }
        }

        record
    }

    fn parse_article(&self, node: Node<'_, '_>, source: &str, ctx: &mut ParseContext) -> ArticleRecord {
        ctx.check_namespaces(node);
        let mut article = ArticleRecord::new(node.attribute(ID_ATTRIBUTE).unwrap_or_default());
        article.attributes = opaque_attributes_except(node, ID_ATTRIBUTE);

        for child in node.children() {
            let tag = get_tag_name(child);
            // Text fields carry no attributes; a decorated one stays verbatim.
            let modeled = child.is_element()
                && child.attributes().len() == 0
                && !has_namespaces(child)
                && child.children().all(|c| c.is_text())
                && self
                    .registry
                    .classify_child(ElementKind::Article, tag)
                    .is_known();
            match article.text_field_mut(tag).filter(|slot| modeled && slot.is_none()) {
                Some(slot) => *slot = Some(text_content(child)),
                None => ctx.keep_raw(child, source, Placement::Article, &mut article.unrecognized_children),
            }
        }

        article
    }
}

fn parse_data_object(node: Node<'_, '_>, source: &str, ctx: &mut ParseContext) -> DataObject {
    ctx.check_namespaces(node);
    let mut object = DataObject::new(node.attribute(DATA_OBJECT_TYPE_FIELD).unwrap_or_default());
    object.attributes = opaque_attributes_except(node, DATA_OBJECT_TYPE_FIELD);
    for child in node.children() {
        ctx.keep_raw(child, source, Placement::DataObject, &mut object.unrecognized_children);
    }
    object
}

/// All attributes of an element as raw strings, in source order.
fn opaque_attributes(node: Node<'_, '_>) -> AttributeMap {
    opaque_attributes_except(node, "")
}

/// Attributes in the `xml:` namespace keep their prefix. No other
/// namespace can be in scope on a modeled element.
fn opaque_attributes_except(node: Node<'_, '_>, skip: &str) -> AttributeMap {
    node.attributes()
        .filter(|attr| attr.namespace().is_some() || attr.name() != skip)
        .map(|attr| {
            let name = match attr.namespace() {
                Some(NS_XML_URI) => format!("xml:{}", attr.name()),
                _ => attr.name().to_string(),
            };
            (name, AttrValue::Opaque(attr.value().to_string()))
        })
        .collect()
}

fn has_namespaces(node: Node<'_, '_>) -> bool {
    node.namespaces().any(|ns| ns.uri() != NS_XML_URI)
}

fn reject_namespaces(node: Node<'_, '_>) -> Result<()> {
    match node.namespaces().find(|ns| ns.uri() != NS_XML_URI) {
        Some(ns) => Err(StorylineError::UnsupportedNamespace {
            element: get_tag_name(node).to_string(),
            declaration: ns
                .name()
                .map_or_else(|| "xmlns".to_string(), |prefix| format!("xmlns:{prefix}")),
        }),
        None => Ok(()),
    }
}
