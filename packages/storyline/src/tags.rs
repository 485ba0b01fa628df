//! Engine link tags embedded in article text.
//!
//! A link tag such as `[%personlink#1 f l]` is replaced in game by a link to
//! the entity matched by the storyline's first data object. The number is a
//! 1-based index into `REQUIRED_DATA`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::model::StorylineRecord;

/// Link tag: `[%<word>link#<n><options>]`.
/// Captures: (1) `[%<word>link#`, (2) the index, (3) options and closing bracket.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[%(\w+)link#)(\d+)(\s*[^\]]*\])").expect("valid regex"));

/// One link tag found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTag {
    /// Entity kind before `link`, e.g. `person` or `team`.
    pub kind: String,
    /// 1-based data object index.
    pub index: usize,
    /// The tag as written.
    pub markup: String,
}

/// A link tag pointing past the storyline's data objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    pub article: String,
    pub tag: LinkTag,
    /// Number of data objects the storyline has.
    pub available: usize,
}

/// Rewrite the index of every link tag in `text` to `index`.
///
/// Returns the input unchanged (borrowed) when it holds no link tags.
///
/// # Examples
/// ```
/// use ootp_storyline::tags::renumber_links;
///
/// let text = "[%personlink#1 f l] joins [%teamlink#1].";
/// assert_eq!(renumber_links(text, 2), "[%personlink#2 f l] joins [%teamlink#2].");
/// assert_eq!(renumber_links("no tags", 2), "no tags");
/// ```
#[must_use]
pub fn renumber_links(text: &str, index: usize) -> Cow<'_, str> {
    LINK_TAG_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        format!("{}{index}{}", &caps[1], &caps[4])
    })
}

/// All link tags in `text`, in order of appearance.
///
/// Tags whose index does not fit in `usize` are skipped.
#[must_use]
pub fn link_references(text: &str) -> Vec<LinkTag> {
    LINK_TAG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let index = caps[3].parse().ok()?;
            Some(LinkTag {
                kind: caps[2].to_string(),
                index,
                markup: caps[0].to_string(),
            })
        })
        .collect()
}

/// Link tags in a storyline's articles that reference a missing data object.
///
/// Subjects, text and injury descriptions are all checked. Index 0 is
/// never valid.
#[must_use]
pub fn dangling_links(record: &StorylineRecord) -> Vec<DanglingLink> {
    let available = record.required_data.len();
    let mut dangling = Vec::new();

    for article in &record.articles {
        for (_, text) in article.text_fields() {
            let Some(text) = text else { continue };
            for tag in link_references(text) {
                if tag.index == 0 || tag.index > available {
                    dangling.push(DanglingLink {
                        article: article.id.clone(),
                        tag,
                        available,
                    });
                }
            }
        }
    }

    if !dangling.is_empty() {
        warn!(
            storyline = %record.id,
            count = dangling.len(),
            "Link tags reference missing data objects"
        );
    }
    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArticleRecord, DataObject};

    #[test]
    fn test_renumber_keeps_options() {
        assert_eq!(
            renumber_links("[%personlink#3 l] and [%citylink#12]", 1),
            "[%personlink#1 l] and [%citylink#1]"
        );
    }

    #[test]
    fn test_renumber_ignores_non_link_brackets() {
        let text = "[%stat#1] [note] [%teamlink#x]";
        assert!(matches!(renumber_links(text, 4), Cow::Borrowed(_)));
    }

    #[test]
    fn test_link_references() {
        let tags = link_references("[%personlink#1 f l] beat [%teamlink#2]");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].kind, "person");
        assert_eq!(tags[0].index, 1);
        assert_eq!(tags[0].markup, "[%personlink#1 f l]");
        assert_eq!(tags[1].kind, "team");
        assert_eq!(tags[1].index, 2);
    }

    #[test]
    fn test_dangling_links() {
        let mut record = StorylineRecord::new("s");
        record.required_data.push(DataObject::new("PLAYER"));
        record.articles.push(
            ArticleRecord::new("1")
                .with_subject("[%personlink#1 l] shines")
                .with_text("[%personlink#1] and [%teamlink#2] and [%agelink#0]"),
        );

        let dangling = dangling_links(&record);
        assert_eq!(dangling.len(), 2);
        assert_eq!(dangling[0].article, "1");
        assert_eq!(dangling[0].tag.index, 2);
        assert_eq!(dangling[0].available, 1);
        assert_eq!(dangling[1].tag.index, 0);
    }
}
