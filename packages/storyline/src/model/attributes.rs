//! Ordered attribute storage with known/opaque tagging.

use std::borrow::Cow;

use crate::schema::FieldValue;

/// Value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Typed value of a schema-known attribute.
    Known(FieldValue),
    /// Raw value of an attribute the schema does not describe, kept verbatim.
    Opaque(String),
}

impl AttrValue {
    /// The string written to the document for this value.
    #[must_use]
    pub fn raw(&self) -> Cow<'_, str> {
        match self {
            Self::Known(value) => Cow::Owned(value.canonical()),
            Self::Opaque(raw) => Cow::Borrowed(raw),
        }
    }

    #[must_use]
    pub fn known(&self) -> Option<&FieldValue> {
        match self {
            Self::Known(value) => Some(value),
            Self::Opaque(_) => None,
        }
    }

    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

/// A named attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
    /// Source text of a known value whose canonical form differs from it,
    /// e.g. `007` for the integer 7. Cleared when the value is replaced.
    source: Option<String>,
}

impl Attribute {
    /// The text written to the document: the source text while the value is
    /// unedited, the canonical form otherwise.
    #[must_use]
    pub fn written(&self) -> Cow<'_, str> {
        match (&self.value, &self.source) {
            (AttrValue::Known(_), Some(source)) => Cow::Borrowed(source),
            _ => self.value.raw(),
        }
    }

    /// Replace the value and forget any source text.
    pub(crate) fn replace(&mut self, value: AttrValue) -> AttrValue {
        self.source = None;
        std::mem::replace(&mut self.value, value)
    }

    /// Convert a raw value to its typed form, remembering how it was written.
    pub(crate) fn promote(&mut self, value: FieldValue) {
        if let AttrValue::Opaque(raw) = &self.value {
            if *raw != value.canonical() {
                self.source = Some(raw.clone());
            }
        }
        self.value = AttrValue::Known(value);
    }
}

/// Attributes of one element, in document order.
///
/// Replacing a value keeps its position; new names are appended. This is
/// what lets a load/edit/save cycle keep the source attribute order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<Attribute>,
}

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// The value as it would be written to the document.
    #[must_use]
    pub fn get_raw(&self, name: &str) -> Option<Cow<'_, str>> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(Attribute::written)
    }

    /// Typed boolean value; `None` when absent or not a known boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.known()?.as_bool()
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name)?.known()?.as_int()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|a| a.name == name)
    }

    /// Set a value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(existing.replace(value)),
            None => {
                self.entries.push(Attribute {
                    name,
                    value,
                    source: None,
                });
                None
            }
        }
    }

    /// Set a typed value.
    pub fn set_known(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<AttrValue> {
        self.set(name, AttrValue::Known(value.into()))
    }

    /// Set a raw passthrough value.
    pub fn set_opaque(
        &mut self,
        name: impl Into<String>,
        raw: impl Into<String>,
    ) -> Option<AttrValue> {
        self.set(name, AttrValue::Opaque(raw.into()))
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.entries.iter().position(|a| a.name == name)?;
        Some(self.entries.remove(index).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.entries.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, AttrValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.set(name, value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
