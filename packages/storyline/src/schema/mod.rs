//! Attribute schema registry.
//!
//! A static catalog describing, per element kind, which attributes and
//! child elements the editor understands, their value domains, defaults and
//! whether they are required. It is built once from a bundled YAML asset
//! and never mutated afterwards.

mod core;
mod definition;
mod types;

pub use core::{Preset, SchemaRegistry, BUNDLED_SCHEMA, DATA_OBJECT_TYPE_FIELD};
pub use types::{
    Category, Classification, ElementKind, FieldLocation, FieldSpec, FieldValue, ValueKind,
    FALSE_LITERAL, TRUE_LITERAL,
};
