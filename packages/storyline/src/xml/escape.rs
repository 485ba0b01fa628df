//! Escaping for values written back into the storyline XML.

/// Escape character data for element content.
///
/// # Examples
/// ```
/// use ootp_storyline::xml::escape_text;
///
/// assert_eq!(escape_text("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
/// ```
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for a double-quoted attribute.
///
/// Tabs and line breaks are written as character references because a
/// conforming parser would otherwise normalize them to spaces.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_escape_attribute_quotes() {
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_escape_attribute_whitespace_survives_parse() {
        let value = "line one\nline\ttwo";
        let xml = format!(r#"<a v="{}"/>"#, escape_attribute(value));
        let doc = Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().attribute("v"), Some(value));
    }

    #[test]
    fn test_escape_text_survives_parse() {
        let value = "a < b && c > d\r\n";
        let xml = format!("<t>{}</t>", escape_text(value));
        let doc = Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().text(), Some(value));
    }
}
