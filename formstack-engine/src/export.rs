//! CSV export of a form type's records, one column per current field.

use formstack_model::{FieldConfig, Projection, Record};
use std::io::Write;

use crate::EngineResult;

/// Writes `records` as CSV: `id`, `createdAt`, then one column per field
/// labelled with the field's label. Absent values are empty cells and values
/// of fields no longer in `fields` are left out.
pub fn write_csv<W: Write>(fields: &[FieldConfig], records: &[Record], writer: W) -> EngineResult<()> {
    let projection = Projection::from_fields(fields);
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["id", "createdAt"];
    header.extend(fields.iter().map(|field| field.label.as_str()));
    out.write_record(&header)?;

    for record in records {
        let mut row = vec![record.id.to_string(), record.created_at.to_rfc3339()];
        row.extend(projection.row(record));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}
