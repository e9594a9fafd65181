//! Conversion between requests and stored field values.
//!
//! Decoding is driven entirely by the field list: keys the list does not
//! name are ignored, which is how the `formType` discriminator and other form
//! metadata pass through without errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use formstack_model::{
    FieldConfig, FieldEntry, FieldValue, FieldsData, FormType, InputType, Record, RecordId,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{RawRequest, SlotSelection, StoredUploads};

/// Whether a decode is for a new record or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Every required field must be present.
    Create,
    /// Absent fields keep their stored values.
    Update,
}

/// Validated field values of a request, with uploads not yet written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    /// Coerced values of every non-file field the request supplied.
    pub values: FieldsData,
    /// Names of file fields the request supplied an upload for. Each is also
    /// the upload's slot name.
    pub file_fields: Vec<String>,
}

impl DecodedRecord {
    /// Slots whose uploads have to be written for this record.
    pub fn file_slots(&self) -> impl Iterator<Item = &str> {
        self.file_fields.iter().map(String::as_str)
    }

    /// Adds the stored uploads as file values. Fields whose upload is missing
    /// from `stored` are left out.
    #[must_use]
    pub fn attach(self, stored: &StoredUploads) -> FieldsData {
        let mut values = self.values;
        for name in self.file_fields {
            if let Some(file) = stored.get(&name) {
                values.set(name, FieldValue::File(file.clone()));
            }
        }
        values
    }
}

/// Validates and coerces the values `request` supplies for `fields`.
///
/// Nothing is written: file fields are only checked for presence in
/// `uploads`.
pub fn decode(
    fields: &[FieldConfig],
    request: &RawRequest,
    uploads: &SlotSelection<'_>,
    mode: DecodeMode,
) -> Result<DecodedRecord, ValidationError> {
    let mut decoded = DecodedRecord::default();
    for field in fields {
        let required = mode == DecodeMode::Create && field.is_required();
        match field.input_type {
            InputType::File => {
                if uploads.contains(&field.name) {
                    decoded.file_fields.push(field.name.clone());
                } else if required {
                    return Err(ValidationError::field(&field.name, "a file upload is required"));
                }
            }
            InputType::Text | InputType::Number | InputType::Date | InputType::Select => {
                let supplied = request.text(&field.name);
                if required && supplied.is_none_or(|raw| raw.trim().is_empty()) {
                    return Err(ValidationError::field(&field.name, "this field is required"));
                }
                match supplied {
                    // Text is stored as sent, so an empty string clears the value.
                    Some(raw) if field.input_type == InputType::Text => {
                        decoded.values.set(field.name.clone(), coerce(field, raw)?);
                    }
                    Some(raw) if !raw.trim().is_empty() => {
                        decoded.values.set(field.name.clone(), coerce(field, raw)?);
                    }
                    Some(_) | None => {}
                }
            }
        }
    }
    Ok(decoded)
}

/// Converts one submitted text value according to the field's input type.
pub fn coerce(field: &FieldConfig, raw: &str) -> Result<FieldValue, ValidationError> {
    match field.input_type {
        InputType::Text => Ok(FieldValue::Text(raw.to_string())),
        InputType::Number => parse_number(raw.trim())
            .map(FieldValue::Number)
            .ok_or_else(|| ValidationError::field(&field.name, format!("{raw:?} is not a number"))),
        InputType::Date => {
            let raw = raw.trim();
            if is_iso_date(raw) {
                Ok(FieldValue::Date(raw.to_string()))
            } else {
                Err(ValidationError::field(
                    &field.name,
                    format!("{raw:?} is not an ISO 8601 date"),
                ))
            }
        }
        InputType::Select => {
            if field.options.iter().any(|option| option == raw) {
                Ok(FieldValue::Select(raw.to_string()))
            } else {
                Err(ValidationError::field(
                    &field.name,
                    format!("{raw:?} is not one of the allowed options"),
                ))
            }
        }
        InputType::File => Err(ValidationError::field(
            &field.name,
            "file fields take an upload, not a text value",
        )),
    }
}

/// Integers stay integers; anything else must be a finite float.
fn parse_number(raw: &str) -> Option<Number> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(int.into());
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_iso_date(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").is_ok()
        || DateTime::parse_from_rfc3339(raw).is_ok()
}

/// Which shape a record's fields are encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordView {
    /// The stored name/value pairs, orphaned fields included.
    #[default]
    Raw,
    /// One entry per current field definition, in definition order.
    Structured,
}

/// A field definition paired with the record's value for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredField {
    pub id: String,
    pub name: String,
    pub label: String,
    pub input_type: InputType,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedFields {
    Raw(Vec<FieldEntry>),
    Structured(Vec<StructuredField>),
}

/// A record as returned to readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedRecord {
    pub id: RecordId,
    pub form_type: FormType,
    pub fields_data: EncodedFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Encodes `record` in `view`, using `fields` for the structured shape.
#[must_use]
pub fn encode(record: &Record, fields: &[FieldConfig], view: RecordView) -> EncodedRecord {
    let fields_data = match view {
        RecordView::Raw => EncodedFields::Raw(record.fields_data.iter().cloned().collect()),
        RecordView::Structured => EncodedFields::Structured(
            fields
                .iter()
                .map(|field| StructuredField {
                    id: field.id.clone(),
                    name: field.name.clone(),
                    label: field.label.clone(),
                    input_type: field.input_type,
                    value: record.project(&field.name).map(FieldValue::to_json),
                })
                .collect(),
        ),
    };
    EncodedRecord {
        id: record.id,
        form_type: record.form_type.clone(),
        fields_data,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
