use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{InputType, ValidationError};

/// Reference to an uploaded file held by the blob backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileRef {
    /// Opaque location returned by the blob backend.
    pub uri: String,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// The value a record holds for one field.
///
/// One variant per [`InputType`]; every consumer matches exhaustively, so a
/// new input type is a compile-time change.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Number),
    /// ISO 8601 date or date-time, kept as supplied.
    Date(String),
    Select(String),
    File(StoredFileRef),
}

impl FieldValue {
    #[must_use]
    pub fn input_type(&self) -> InputType {
        match self {
            Self::Text(_) => InputType::Text,
            Self::Number(_) => InputType::Number,
            Self::Date(_) => InputType::Date,
            Self::Select(_) => InputType::Select,
            Self::File(_) => InputType::File,
        }
    }

    /// String content of text, date and select values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Date(s) | Self::Select(s) => Some(s),
            Self::Number(_) | Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(_) | Self::Date(_) | Self::Select(_) | Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&StoredFileRef> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) | Self::Number(_) | Self::Date(_) | Self::Select(_) => None,
        }
    }

    /// Human-readable rendering used by list views and exports.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::Date(s) | Self::Select(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::File(file) => file.uri.clone(),
        }
    }

    /// The bare JSON value, without the type tag.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) | Self::Date(s) | Self::Select(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::File(file) => serde_json::json!({
                "uri": file.uri,
                "originalFilename": file.original_filename,
                "mimeType": file.mime_type,
                "sizeBytes": file.size_bytes,
            }),
        }
    }

    /// Rebuilds a value from its type tag and bare JSON value.
    pub fn from_json(input_type: InputType, value: Value) -> Result<Self, String> {
        match (input_type, value) {
            (InputType::Text, Value::String(s)) => Ok(Self::Text(s)),
            (InputType::Date, Value::String(s)) => Ok(Self::Date(s)),
            (InputType::Select, Value::String(s)) => Ok(Self::Select(s)),
            (InputType::Number, Value::Number(n)) => Ok(Self::Number(n)),
            (InputType::File, value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Self::File)
                .map_err(|e| format!("invalid file reference: {e}")),
            (input_type, other) => Err(format!(
                "value {other} does not match input type {input_type}"
            )),
        }
    }

    pub(crate) fn from_tagged(
        name: &str,
        input_type: InputType,
        value: Value,
    ) -> Result<Self, ValidationError> {
        Self::from_json(input_type, value).map_err(|reason| ValidationError::field(name, reason))
    }
}

impl From<StoredFileRef> for FieldValue {
    fn from(file: StoredFileRef) -> Self {
        Self::File(file)
    }
}
