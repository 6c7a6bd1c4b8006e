//! Delimited-text rendering and parsing for tabular step output
//!
//! Records are column-ordered maps; the header row of rendered output is the
//! key order of the first record.

use crate::{Error, Result};
use indexmap::IndexMap;

/// A single row: column name -> value, in column order
pub type Record = IndexMap<String, String>;

/// Render records as CSV text
///
/// The header row is the key order of the first record. Values containing the
/// delimiter, quote character, or line breaks are quoted per RFC 4180.
/// An empty record sequence renders to empty text.
pub fn render_records(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let header: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut out = String::new();
    out.push_str(&render_row(header.iter().copied()));
    out.push('\n');

    for record in records {
        let row = render_row(
            header
                .iter()
                .map(|col| record.get(*col).map(String::as_str).unwrap_or("")),
        );
        out.push_str(&row);
        out.push('\n');
    }

    out
}

fn render_row<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Parse CSV text back into records
///
/// The first row is taken as the header; every following row becomes one
/// record keyed by the header columns. Handles quoted fields, doubled quotes,
/// and CRLF line endings.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut rows = parse_rows(text)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let header = rows.remove(0);
    let mut records = Vec::with_capacity(rows.len());

    for (line_no, row) in rows.into_iter().enumerate() {
        if row.len() != header.len() {
            return Err(Error::MalformedCsv(format!(
                "row {} has {} fields, header has {}",
                line_no + 2,
                row.len(),
                header.len()
            )));
        }
        let record: Record = header.iter().cloned().zip(row).collect();
        records.push(record);
    }

    Ok(records)
}

fn parse_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    let mut saw_any = false;

    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    row.push(std::mem::take(&mut field));
                }
                '\r' => {
                    // Consumed as part of CRLF; a lone CR also ends the row
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(Error::MalformedCsv("unterminated quoted field".to_string()));
    }

    // Trailing row without a final newline
    if saw_any && (!field.is_empty() || !row.is_empty()) {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}
