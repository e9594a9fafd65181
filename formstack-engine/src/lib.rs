//! Ingestion engine for formstack.
//!
//! Turns loosely shaped requests into validated records and back:
//! - [`FieldRegistry`]: the per-form-type field lists, loaded once and
//!   updated through explicit admin operations
//! - [`codec`]: decodes request values against a field list and encodes
//!   records into raw or structured views
//! - [`FileSlotRouter`]: picks uploaded files out of a request by slot name
//!   and writes them to blob storage
//! - [`RecordStore`]: create / replace / list / delete on top of a
//!   [`DocumentStore`](formstack_storage::DocumentStore)
//!
//! All operations are blocking; callers in async contexts run them on a
//! blocking pool.

pub mod codec;
mod defaults;
mod error;
mod export;
mod records;
mod registry;
mod request;
mod slots;

pub use codec::{DecodeMode, DecodedRecord, EncodedFields, EncodedRecord, RecordView, StructuredField};
pub use defaults::DefaultFields;
pub use error::{EngineError, EngineResult};
pub use export::write_csv;
pub use records::RecordStore;
pub use registry::FieldRegistry;
pub use request::{FORM_TYPE_KEY, RawRequest, UploadedFile};
pub use slots::{DEFAULT_SLOTS, FileSlotRouter, SlotMode, SlotSelection, StoredUploads};
