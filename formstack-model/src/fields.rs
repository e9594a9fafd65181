//! Ordered name → value mapping stored inside every record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldValue, InputType, StoredFileRef, ValidationError};

/// One `{name, value}` pair.
///
/// Serialized as `{"name": .., "type": .., "value": ..}` so the value's
/// variant survives a round trip while `value` stays a plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldEntryRepr", into = "FieldEntryRepr")]
pub struct FieldEntry {
    pub name: String,
    pub value: FieldValue,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct FieldEntryRepr {
    name: String,
    #[serde(rename = "type")]
    input_type: InputType,
    value: Value,
}

impl TryFrom<FieldEntryRepr> for FieldEntry {
    type Error = ValidationError;

    fn try_from(repr: FieldEntryRepr) -> Result<Self, Self::Error> {
        let value = FieldValue::from_tagged(&repr.name, repr.input_type, repr.value)?;
        Ok(Self {
            name: repr.name,
            value,
        })
    }
}

impl From<FieldEntry> for FieldEntryRepr {
    fn from(entry: FieldEntry) -> Self {
        Self {
            input_type: entry.value.input_type(),
            value: entry.value.to_json(),
            name: entry.name,
        }
    }
}

/// The field values of one record.
///
/// Keeps insertion order but behaves as a mapping: setting a name that is
/// already present replaces its value in place, so a name never appears
/// twice. Absence of a name is a normal state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FieldEntry>", into = "Vec<FieldEntry>")]
pub struct FieldsData {
    entries: Vec<FieldEntry>,
}

impl FieldsData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets `name` to `value`, returning the value it replaced.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(FieldEntry { name, value });
                None
            }
        }
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).value)
    }

    /// Writes every entry of `other` over `self`, leaving names that `other`
    /// does not mention untouched. Returns the values that were overwritten.
    pub fn merge(&mut self, other: FieldsData) -> Vec<FieldValue> {
        other
            .entries
            .into_iter()
            .filter_map(|entry| self.set(entry.name, entry.value))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Every file reference held by this mapping.
    pub fn file_refs(&self) -> impl Iterator<Item = &StoredFileRef> {
        self.entries.iter().filter_map(|entry| entry.value.as_file())
    }
}

impl From<Vec<FieldEntry>> for FieldsData {
    fn from(entries: Vec<FieldEntry>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect()
    }
}

impl From<FieldsData> for Vec<FieldEntry> {
    fn from(data: FieldsData) -> Self {
        data.entries
    }
}

impl<N: Into<String>> FromIterator<(N, FieldValue)> for FieldsData {
    fn from_iter<I: IntoIterator<Item = (N, FieldValue)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.set(name, value);
        }
        data
    }
}

impl<N: Into<String>> Extend<(N, FieldValue)> for FieldsData {
    fn extend<I: IntoIterator<Item = (N, FieldValue)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

impl IntoIterator for FieldsData {
    type Item = FieldEntry;
    type IntoIter = std::vec::IntoIter<FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldsData {
    type Item = &'a FieldEntry;
    type IntoIter = std::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
