//! XML helpers: DOM navigation over `roxmltree` and output escaping.

mod escape;
mod utils;

pub use escape::{escape_attribute, escape_text};
pub use utils::{get_tag_name, has_tag, is_blank_text, source_markup, text_content};
