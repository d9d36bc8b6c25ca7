//! Tabular samples taken from CSV and spreadsheet uploads

use serde::{Deserialize, Serialize};

/// Number of data rows kept from a table upload
pub const SAMPLE_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Data rows in the source, before sampling
    pub total_rows: usize,
}

impl TablePreview {
    /// Build a preview from records whose first entry is the header row
    pub fn from_records(records: Vec<Vec<String>>) -> Option<Self> {
        let mut records = records.into_iter();
        let headers = records.next()?;
        let rows: Vec<Vec<String>> = records.collect();
        let total_rows = rows.len();

        Some(Self {
            headers,
            rows: rows.into_iter().take(SAMPLE_ROWS).collect(),
            total_rows,
        })
    }

    /// Header and sampled rows as comma-separated text
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for record in std::iter::once(&self.headers).chain(&self.rows) {
            let line: Vec<String> = record.iter().map(|field| quote_field(field)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// First few rows, for listing an upload
    pub fn head(&self, count: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(count)]
    }
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split delimited text into records, honouring double-quoted fields.
///
/// Returns `None` when a quoted field is never closed.
pub(crate) fn parse_csv(text: &str) -> Option<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return None;
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    // Blank lines carry no data
    records.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    Some(records)
}
