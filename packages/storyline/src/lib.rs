//! OOTP Storyline Editor - load, edit and save storyline database XML.
//!
//! This crate reads the storyline dialect consumed by Out of the Park
//! Baseball into a typed record model, lets a front end edit it, and writes
//! it back without losing attributes or markup it does not understand.
//!
//! # Example
//!
//! ```
//! use ootp_storyline::{parse, serialize};
//!
//! let xml = r#"<STORYLINE_DATABASE><STORYLINES>
//!     <STORYLINE id="rookie_sensation" random_frequency="10" mod_note="kept">
//!         <ARTICLES>
//!             <ARTICLE id="1"><SUBJECT>Rookie Sensation</SUBJECT><TEXT>...</TEXT></ARTICLE>
//!         </ARTICLES>
//!     </STORYLINE>
//! </STORYLINES></STORYLINE_DATABASE>"#;
//!
//! let model = parse(xml).unwrap();
//! let registry = ootp_storyline::SchemaRegistry::bundled();
//! assert!(model.is_complete("rookie_sensation", registry).unwrap());
//!
//! let written = serialize(&model);
//! assert!(written.contains(r#"mod_note="kept""#));
//! assert_eq!(parse(&written).unwrap(), model);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Dialect constants, id validation and runtime settings
//! - [`error`]: Error types and Result alias
//! - [`schema`]: Attribute schema registry built from a bundled YAML asset
//! - [`xml`]: XML navigation and escaping helpers
//! - [`model`]: Records, attribute storage and the document accessor contract
//! - [`parser`]: XML text to document model
//! - [`serializer`]: Document model to XML text
//! - [`index`]: Text search over a document
//! - [`tags`]: Engine link tags in article text
//! - [`storage`]: File load and atomic save
//! - [`session`]: Editing session owning one open document
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod schema;
pub mod serializer;
pub mod session;
pub mod storage;
pub mod tags;
pub mod xml;

// Re-export main functions
pub use parser::parse;
pub use serializer::serialize;

// Re-export commonly used items
pub use error::{Problem, Result, StorylineError, Violation};
pub use index::QueryIndex;
pub use model::{ArticleRecord, DataObject, DocumentModel, Readiness, StorylineRecord};
pub use schema::SchemaRegistry;
pub use session::EditingSession;
