//! Name-based read path over records.
//!
//! Consumers never assume a record's shape or field order: they ask for a
//! field by name and treat absence as a normal answer.

use serde_json::Number;

use crate::{FieldConfig, FieldValue, Record, StoredFileRef};

/// Value of `name` in `record`, or `None` when the record has no such field.
#[must_use]
pub fn project<'a>(record: &'a Record, name: &str) -> Option<&'a FieldValue> {
    record.fields_data.get(name)
}

impl Record {
    /// See [`project`].
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&FieldValue> {
        project(self, name)
    }

    /// String content of a text, date or select field.
    #[must_use]
    pub fn project_text(&self, name: &str) -> Option<&str> {
        self.project(name).and_then(FieldValue::as_str)
    }

    #[must_use]
    pub fn project_number(&self, name: &str) -> Option<&Number> {
        self.project(name).and_then(FieldValue::as_number)
    }

    #[must_use]
    pub fn project_file(&self, name: &str) -> Option<&StoredFileRef> {
        self.project(name).and_then(FieldValue::as_file)
    }

    /// Display string for `name`; empty when absent.
    #[must_use]
    pub fn project_display(&self, name: &str) -> String {
        self.project(name).map(FieldValue::display).unwrap_or_default()
    }
}

/// A fixed list of field names projected out of many records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// One column per field, in field-list order.
    pub fn from_fields(fields: &[FieldConfig]) -> Self {
        Self::new(fields.iter().map(|field| field.name.as_str()))
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values<'a>(&self, record: &'a Record) -> Vec<Option<&'a FieldValue>> {
        self.columns
            .iter()
            .map(|name| project(record, name))
            .collect()
    }

    /// Display strings for every column; absent fields render empty.
    #[must_use]
    pub fn row(&self, record: &Record) -> Vec<String> {
        self.columns
            .iter()
            .map(|name| record.project_display(name))
            .collect()
    }
}
