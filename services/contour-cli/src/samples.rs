//! Delimited sample file reading.
//!
//! Records are read with the `csv` crate, so quoted fields and CRLF line
//! endings work as usual. Lines starting with `#` and blank lines are
//! skipped. The first record is treated as a header and skipped when any of
//! the requested columns is not a number. A whitespace delimiter collapses
//! runs of that character.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Read the requested columns of a delimited file.
///
/// Returns one vector per entry of `columns`, in the same order.
pub fn read_columns(path: &Path, delimiter: char, columns: &[usize]) -> anyhow::Result<Vec<Vec<f64>>> {
    let reader = reader_builder(delimiter)?
        .from_path(path)
        .with_context(|| format!("failed to read samples {}", path.display()))?;
    let values = collect_columns(reader, delimiter, columns)
        .with_context(|| format!("invalid sample file {}", path.display()))?;

    debug!(
        path = %path.display(),
        rows = values.first().map(Vec::len).unwrap_or(0),
        columns = columns.len(),
        "Read samples"
    );
    Ok(values)
}

/// Parse the requested columns out of delimited text.
pub fn parse_columns(content: &str, delimiter: char, columns: &[usize]) -> anyhow::Result<Vec<Vec<f64>>> {
    let reader = reader_builder(delimiter)?.from_reader(content.as_bytes());
    collect_columns(reader, delimiter, columns)
}

fn reader_builder(delimiter: char) -> anyhow::Result<ReaderBuilder> {
    let Ok(byte) = u8::try_from(delimiter) else {
        bail!("delimiter must be a single-byte character, got {delimiter:?}");
    };
    if !byte.is_ascii() {
        bail!("delimiter must be an ASCII character, got {delimiter:?}");
    }

    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(byte)
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true);
    Ok(builder)
}

fn collect_columns<R: Read>(
    mut reader: csv::Reader<R>,
    delimiter: char,
    columns: &[usize],
) -> anyhow::Result<Vec<Vec<f64>>> {
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    let mut seen_data = false;

    for record in reader.records() {
        let record = record.context("malformed record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields = fields(&record, delimiter);
        if fields.iter().all(|field| field.is_empty()) {
            continue;
        }

        let mut row = Vec::with_capacity(columns.len());
        for &column in columns {
            let Some(field) = fields.get(column) else {
                bail!(
                    "line {line}: expected at least {} fields, found {}",
                    column + 1,
                    fields.len()
                );
            };
            row.push(field.parse::<f64>());
        }

        let first = !seen_data;
        seen_data = true;
        if row.iter().any(|v| v.is_err()) {
            if first {
                debug!(line, "Skipping header row");
                continue;
            }
            bail!("line {line}: non-numeric value in {:?}", fields.join(&delimiter.to_string()));
        }

        for (column, value) in values.iter_mut().zip(row) {
            column.push(value?);
        }
    }

    Ok(values)
}

/// Whitespace delimiters collapse runs, so their empty fields are dropped.
fn fields(record: &StringRecord, delimiter: char) -> Vec<&str> {
    if delimiter.is_whitespace() {
        record.iter().filter(|field| !field.is_empty()).collect()
    } else {
        record.iter().collect()
    }
}
