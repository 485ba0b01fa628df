//! Storyline record model.
//!
//! Records, their attribute storage, the accessor contract of an open
//! document and the derived classifications computed from it.

mod attributes;
mod census;
mod document;
mod readiness;
mod types;
mod validation;

pub use attributes::{AttrValue, Attribute, AttributeMap};
pub use census::{AttributeCensus, NameCensus};
pub use document::{DocumentModel, UpsertOutcome};
pub use readiness::{blocking_problems, Readiness};
pub use types::{
    ArticleRecord, DataObject, Placement, RawNode, SeasonWindow, StorylineRecord,
    MAIN_ACTOR_ATTRIBUTE,
};
pub use validation::{RecordValidator, ID_ATTRIBUTE};
