//! Record model for formstack.
//!
//! Defines the types every other formstack crate depends on:
//! - [`FieldConfig`]: an admin-defined field description (name, label, input kind, options)
//! - [`FieldValue`]: the tagged value a record holds for one field
//! - [`FieldsData`]: the ordered, last-write-wins name → value mapping inside a record
//! - [`Record`]: a stored instance of a form type
//! - [`Projection`] and the `project*` accessors: the name-based read path
//!
//! Nothing here performs I/O. Decoding requests and persisting records is the
//! job of `formstack-engine` and `formstack-storage`.

mod error;
mod fields;
mod projector;
mod record;
mod schema;
mod value;

pub use error::ValidationError;
pub use fields::{FieldEntry, FieldsData};
pub use projector::{Projection, project};
pub use record::Record;
pub use schema::{FieldConfig, FieldPatch, InputType, validate_field_list};
pub use value::{FieldValue, StoredFileRef};

pub use formstack_types::{FormType, RecordId};
