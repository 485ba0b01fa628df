//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ootp_storyline::xml::get_tag_name;
///
/// let xml = r#"<STORYLINES><STORYLINE id="a"/></STORYLINES>"#;
/// let doc = Document::parse(xml).unwrap();
/// let storyline = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(storyline), "STORYLINE");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Concatenated text of the direct text children of an element, untrimmed.
///
/// CDATA sections are merged into text by the parser, so they are
/// included. Returns an empty string for an empty element.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Check if a node is a text node containing only whitespace.
pub fn is_blank_text(node: Node<'_, '_>) -> bool {
    node.is_text() && node.text().is_none_or(|t| t.trim().is_empty())
}

/// The exact source text a node was parsed from.
///
/// Used to carry content the editor does not model through a
/// load/save cycle without re-serializing it.
pub fn source_markup<'input>(node: Node<'_, 'input>, source: &'input str) -> &'input str {
    let range = node.range();
    source.get(range).unwrap_or_default()
}
