use std::borrow::Cow;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use crate::export::{DateFormat, ExportError, ExportOptions, FieldSelection};
use crate::record::{Field, Record};

/// Cell text for `field`; publication dates are rendered in `date_format`.
///
/// A date that does not parse is passed through as written.
pub fn format_value(record: &Record, field: Field, date_format: DateFormat) -> String {
    if field == Field::PublicationDate {
        if let Some(ts) = record.published_at() {
            return ts.format(date_format.pattern()).to_string();
        }
    }
    record.value(field).to_string()
}

/// Quote `value` when it holds `delimiter`, a double quote or `\n`, doubling
/// any inner quotes. Every other value is written as is.
pub fn escape_cell(value: &str, delimiter: char) -> Cow<'_, str> {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Encode `records` as delimited text.
///
/// Columns follow the canonical field order and cells are escaped with
/// [`escape_cell`]. Lines are joined with `\n` and the text has no trailing
/// newline.
pub fn encode(
    records: &[Record],
    fields: &FieldSelection,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptyRecordSet);
    }
    let columns = fields.fields();
    if columns.is_empty() {
        return Err(ExportError::EmptyFieldSelection);
    }
    let delimiter = char::from(options.delimiter.as_byte());

    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());

    if options.include_headers {
        writer.write_record(
            columns
                .iter()
                .map(|field| escape_cell(field.label(), delimiter).into_owned()),
        )?;
    }

    // The writer emits `""` for a record made of one empty field; remember
    // where those rows start so they can be cut back to empty lines.
    let mut blank_rows = Vec::new();
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|field| {
                let value = format_value(record, *field, options.date_format);
                escape_cell(&value, delimiter).into_owned()
            })
            .collect();
        if cells.len() == 1 && cells[0].is_empty() {
            writer.flush()?;
            blank_rows.push(writer.get_ref().len());
        }
        writer.write_record(&cells)?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    for start in blank_rows.into_iter().rev() {
        bytes.drain(start..start + 2);
    }
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    debug!(
        "encoded {} rows x {} columns delimiter={:?}",
        records.len(),
        columns.len(),
        options.delimiter
    );
    Ok(text)
}

/// Unescaped preview grid: header labels (if enabled) then up to `limit` rows.
pub fn preview_rows(
    records: &[Record],
    fields: &FieldSelection,
    options: &ExportOptions,
    limit: usize,
) -> Vec<Vec<String>> {
    if records.is_empty() {
        return Vec::new();
    }
    let columns = fields.fields();
    let mut grid = Vec::with_capacity(limit + 1);
    if options.include_headers && !columns.is_empty() {
        grid.push(columns.iter().map(|f| f.label().to_string()).collect());
    }
    for record in records.iter().take(limit) {
        grid.push(
            columns
                .iter()
                .map(|field| format_value(record, *field, options.date_format))
                .collect(),
        );
    }
    grid
}
