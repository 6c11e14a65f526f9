use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};
use csv::{ReaderBuilder, Trim};

use crate::error::{Result, SplitError};

/// One parsed row, keyed by the header cell above each field.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xls,
    Xlsx,
}

impl TabularFormat {
    /// Detect the format from the filename extension, case-insensitive.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(TabularFormat::Csv),
            "xls" => Ok(TabularFormat::Xls),
            "xlsx" => Ok(TabularFormat::Xlsx),
            _ => Err(SplitError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Parse an uploaded file into raw header-keyed rows.
///
/// The first row is always treated as the header row. Rows whose fields are
/// all empty are skipped.
pub fn decode(buffer: &[u8], filename: &str) -> Result<Vec<RawRow>> {
    match TabularFormat::from_filename(filename)? {
        TabularFormat::Csv => decode_delimited(buffer),
        TabularFormat::Xls => decode_sheet::<Xls<_>>(buffer),
        TabularFormat::Xlsx => decode_sheet::<Xlsx<_>>(buffer),
    }
}

fn decode_delimited(buffer: &[u8]) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(buffer);

    let headers = reader
        .headers()
        .map_err(|e| SplitError::Decode(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SplitError::Decode(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let mut row = RawRow::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            row.insert(header.to_string(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Parse the first sheet of a workbook. Missing cells default to "".
fn decode_sheet<'a, R>(buffer: &'a [u8]) -> Result<Vec<RawRow>>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook =
        open_workbook_from_rs::<R, _>(Cursor::new(buffer)).map_err(|e| SplitError::Decode(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(SplitError::Decode(e.to_string())),
        None => return Ok(Vec::new()),
    };

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(cells) => cells.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let mut row = RawRow::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let value = cells.get(i).map(cell_to_string).unwrap_or_default();
            row.insert(header.clone(), value);
        }
        if row.values().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Spreadsheet phone columns typically arrive as floats; render integral
/// floats without the trailing ".0".
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}
