use chrono::{DateTime, Utc};
use formstack_types::{FormType, RecordId};
use serde::{Deserialize, Serialize};

use crate::FieldsData;

/// A stored instance of a form type.
///
/// The shape of `fields_data` was checked against the form type's field
/// list when it was written; the list may have changed since, so readers go
/// through the projector rather than assuming a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub form_type: FormType,
    pub fields_data: FieldsData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// A fresh record with a new id, created and updated at `now`.
    #[must_use]
    pub fn new(form_type: FormType, fields_data: FieldsData, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            form_type,
            fields_data,
            created_at: now,
            updated_at: now,
        }
    }
}
