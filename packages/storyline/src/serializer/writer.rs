//! Line-oriented XML writer with tab indentation.

use crate::config::INDENT;
use crate::model::{AttributeMap, RawNode};
use crate::xml::{escape_attribute, escape_text};

/// Builds indented XML text one line at a time.
///
/// Callers are responsible for balancing `open`/`close` calls.
#[derive(Debug, Default)]
pub(crate) struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    /// Write `<tag` followed by the leading attribute and the attribute map.
    fn start_tag(&mut self, tag: &str, leading: Option<(&str, &str)>, attributes: &AttributeMap) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        if let Some((name, value)) = leading {
            self.push_attribute(name, value);
        }
        for attribute in attributes {
            self.push_attribute(&attribute.name, &attribute.written());
        }
    }

    fn push_attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attribute(value));
        self.out.push('"');
    }

    /// Open an element that will have children.
    pub(crate) fn open(&mut self, tag: &str, leading: Option<(&str, &str)>, attributes: &AttributeMap) {
        self.start_tag(tag, leading, attributes);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    /// Write an element with no children.
    pub(crate) fn empty(&mut self, tag: &str, leading: Option<(&str, &str)>, attributes: &AttributeMap) {
        self.start_tag(tag, leading, attributes);
        self.out.push_str(" />\n");
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Write `<tag>text</tag>` on one line.
    pub(crate) fn text_element(&mut self, tag: &str, text: &str) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
        self.out.push_str(&escape_text(text));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Write captured markup unchanged, on its own line.
    pub(crate) fn raw(&mut self, node: &RawNode) {
        self.indent();
        self.out.push_str(&node.markup);
        self.out.push('\n');
    }

    /// Write a line at the current depth.
    pub(crate) fn line(&mut self, text: &str) {
        self.indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
