//! Loading and saving numeric CSV tables.
//!
//! A dataset is row-major: every line is one row and every field a number.
//! Training rows end with their class label. There is no header line, and
//! every row must have the same number of fields.

use crate::error::{Error, Result};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Loads every row of the CSV file at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let rows = from_reader(file)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded dataset");
    Ok(rows)
}

/// Reads every row of CSV data from `reader`.
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(parse_record(&record?)?);
    }
    Ok(rows)
}

/// Writes `rows` to a new CSV file at `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, rows: &[Vec<f64>]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    to_writer(file, rows)
}

/// Writes `rows` as CSV to `writer`.
pub fn to_writer<W: Write>(writer: W, rows: &[Vec<f64>]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    for row in rows {
        writer.write_record(row.iter().map(|v| format_number(*v)))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Parses every field of `record` as a number.
fn parse_record(record: &StringRecord) -> Result<Vec<f64>> {
    let line = record.position().map_or(0, |p| p.line());
    record
        .iter()
        .enumerate()
        .map(|(field, value)| {
            value.parse().map_err(|_| Error::Parse {
                line,
                field,
                value: value.to_owned(),
            })
        })
        .collect()
}

/// Formats `value` in the shortest form that parses back to the same number.
///
/// Like `%g`, magnitudes below `1e-4` or from `1e21` up use exponent notation.
fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && magnitude.is_finite() && !(1e-4..1e21).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}
