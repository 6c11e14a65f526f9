use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::pipeline::decoder::RawRow;

/// Accepted header spellings per semantic field, in lookup order.
const FIRST_NAME_HEADERS: [&str; 4] = ["firstName", "FirstName", "firstname", "FIRSTNAME"];
const PHONE_HEADERS: [&str; 3] = ["phone", "Phone", "PHONE"];
const NOTES_HEADERS: [&str; 3] = ["notes", "Notes", "NOTES"];

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d+$").expect("phone pattern is valid"));

/// A validated task item, ready for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub first_name: String,
    pub phone: String,
    pub notes: String,
}

/// Validate raw rows into canonical records.
///
/// Validation is fail-fast and all-or-nothing: the first invalid row aborts
/// the whole batch with the 1-based row index and the failing field.
pub fn normalize(rows: &[RawRow]) -> Result<Vec<Record>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(row, idx + 1))
        .collect()
}

fn normalize_row(row: &RawRow, row_number: usize) -> Result<Record> {
    let first_name = lookup(row, &FIRST_NAME_HEADERS).trim();
    if first_name.is_empty() {
        return Err(SplitError::Validation {
            row: row_number,
            field: "firstName",
            reason: "is missing or empty",
        });
    }

    let phone = lookup(row, &PHONE_HEADERS).trim();
    if !PHONE_RE.is_match(phone) {
        return Err(SplitError::Validation {
            row: row_number,
            field: "phone",
            reason: "must be numeric and may start with +",
        });
    }

    let notes = lookup(row, &NOTES_HEADERS).trim();

    Ok(Record {
        first_name: first_name.to_string(),
        phone: phone.to_string(),
        notes: notes.to_string(),
    })
}

fn lookup<'a>(row: &'a RawRow, aliases: &[&str]) -> &'a str {
    aliases
        .iter()
        .find_map(|key| row.get(*key))
        .map(String::as_str)
        .unwrap_or("")
}
