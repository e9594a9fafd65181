use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::ValidationError;

/// The input kind of an admin-defined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Number,
    Date,
    Select,
    File,
}

impl InputType {
    /// Wire tag, as used in `inputType` and in stored field entries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::File => "file",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one field of a form type.
///
/// `name` is the key records are read by forever after; renaming a field
/// makes existing records' values for it unreachable by the new name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Stable identifier, used by partial updates.
    pub id: String,
    pub name: String,
    pub label: String,
    pub input_type: InputType,
    /// Allowed values. Only meaningful when `input_type` is `Select`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional fields may be omitted on create.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl FieldConfig {
    fn simple(id: &str, name: &str, label: &str, input_type: InputType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label: label.into(),
            input_type,
            options: Vec::new(),
            description: None,
            optional: false,
        }
    }

    /// Shorthand for a free-text field.
    pub fn text(id: &str, name: &str, label: &str) -> Self {
        Self::simple(id, name, label, InputType::Text)
    }

    /// Shorthand for a numeric field.
    pub fn number(id: &str, name: &str, label: &str) -> Self {
        Self::simple(id, name, label, InputType::Number)
    }

    /// Shorthand for a date field.
    pub fn date(id: &str, name: &str, label: &str) -> Self {
        Self::simple(id, name, label, InputType::Date)
    }

    /// Shorthand for a file upload field. The field name doubles as its upload slot.
    pub fn file(id: &str, name: &str, label: &str) -> Self {
        Self::simple(id, name, label, InputType::File)
    }

    /// Shorthand for a single-select field with fixed options.
    pub fn select<S: Into<String>>(
        id: &str,
        name: &str,
        label: &str,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::simple(id, name, label, InputType::Select)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.optional
    }

    /// Checks the invariants of a single definition.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::field(&self.name, "field id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::general(format!(
                "field '{}' has an empty name",
                self.id
            )));
        }
        match self.input_type {
            InputType::Select if self.options.is_empty() => Err(ValidationError::field(
                &self.name,
                "select fields need at least one option",
            )),
            InputType::Select => Ok(()),
            InputType::Text | InputType::Number | InputType::Date | InputType::File
                if !self.options.is_empty() =>
            {
                Err(ValidationError::field(
                    &self.name,
                    format!("options are only allowed on select fields, not {}", self.input_type),
                ))
            }
            InputType::Text | InputType::Number | InputType::Date | InputType::File => Ok(()),
        }
    }

    /// Applies a partial update. The `id` never changes.
    ///
    /// Switching away from `select` drops the old options unless the patch
    /// sets new ones. The result is not validated here.
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(input_type) = patch.input_type {
            if input_type != InputType::Select && patch.options.is_none() {
                self.options.clear();
            }
            self.input_type = input_type;
        }
        if let Some(options) = &patch.options {
            self.options = options.clone();
        }
        if let Some(description) = &patch.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(optional) = patch.optional {
            self.optional = optional;
        }
    }
}

/// A partial update for one [`FieldConfig`], addressed by its id.
///
/// An empty `description` clears the help text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Checks every definition plus list-wide uniqueness of `name` and `id`.
pub fn validate_field_list(fields: &[FieldConfig]) -> Result<(), ValidationError> {
    let mut names = HashSet::with_capacity(fields.len());
    let mut ids = HashSet::with_capacity(fields.len());
    for field in fields {
        field.validate()?;
        if !names.insert(field.name.as_str()) {
            return Err(ValidationError::field(&field.name, "duplicate field name"));
        }
        if !ids.insert(field.id.as_str()) {
            return Err(ValidationError::field(
                &field.name,
                format!("duplicate field id '{}'", field.id),
            ));
        }
    }
    Ok(())
}
