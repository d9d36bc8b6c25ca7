//! Uploaded file ingestion
//!
//! Converts CSV, XLSX, TXT and DOCX uploads into text or table samples that
//! can be pasted into a prompt. Tables fall back to plain text when they
//! cannot be parsed; Word documents must be valid.

pub(crate) mod io;
pub mod table;
pub(crate) mod xlsx;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::document::read_text;
use io::validate_docx_bytes;
pub use table::TablePreview;

/// Characters of text shown when listing an upload
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Table(TablePreview),
    Text(String),
}

impl Ingested {
    /// Content as it is handed to the prompt
    pub fn prompt_text(&self) -> String {
        match self {
            Ingested::Table(table) => table.to_csv(),
            Ingested::Text(text) => text.clone(),
        }
    }

    /// Short preview for display
    pub fn preview(&self) -> String {
        match self {
            Ingested::Table(table) => {
                let sample = TablePreview {
                    headers: table.headers.clone(),
                    rows: table.head(5).to_vec(),
                    total_rows: table.total_rows,
                };
                sample.to_csv()
            }
            Ingested::Text(text) => text.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub name: String,
    pub content: Ingested,
}

/// Read and ingest a file from disk
pub fn read_file(path: &Path) -> Result<IngestedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();
    read_bytes(&name, &bytes)
}

/// Ingest uploaded bytes, dispatching on the file name's extension
pub fn read_bytes(name: &str, bytes: &[u8]) -> Result<IngestedFile> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = match extension.as_str() {
        "csv" => read_csv(name, bytes),
        "xlsx" => read_xlsx(name, bytes),
        "docx" => {
            validate_docx_bytes(name, bytes)?;
            Ingested::Text(read_text(bytes).with_context(|| format!("parsing {name}"))?)
        }
        _ => Ingested::Text(String::from_utf8_lossy(bytes).into_owned()),
    };

    debug!(
        file = name,
        table = matches!(content, Ingested::Table(_)),
        "ingested upload"
    );

    Ok(IngestedFile {
        name: name.to_string(),
        content,
    })
}

fn read_csv(name: &str, bytes: &[u8]) -> Ingested {
    let table = std::str::from_utf8(bytes)
        .ok()
        .and_then(table::parse_csv)
        .and_then(TablePreview::from_records);

    match table {
        Some(table) => Ingested::Table(table),
        None => {
            warn!(file = name, "could not parse CSV, using raw text");
            Ingested::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn read_xlsx(name: &str, bytes: &[u8]) -> Ingested {
    let table = xlsx::read_first_sheet(bytes)
        .map(|rows| TablePreview::from_records(rows.into_iter().filter(|r| !r.is_empty()).collect()));

    match table {
        Ok(Some(table)) => Ingested::Table(table),
        Ok(None) => Ingested::Text(String::new()),
        Err(e) => {
            warn!(file = name, error = %e, "could not read workbook, using raw text");
            Ingested::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Join ingested uploads into the block of text sent with the prompt
pub fn combine(files: &[IngestedFile]) -> String {
    files
        .iter()
        .map(|file| file.content.prompt_text())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_txt_and_unknown_extensions_are_text() {
        let file = read_bytes("notes.TXT", b"kickoff notes").unwrap();
        assert_eq!(file.content, Ingested::Text("kickoff notes".to_string()));

        let file = read_bytes("data.json", b"{\"a\":1}").unwrap();
        assert_eq!(file.content, Ingested::Text("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let file = read_bytes("raw.txt", &[b'o', b'k', 0xff]).unwrap();
        assert_eq!(file.content, Ingested::Text("ok\u{fffd}".to_string()));
    }

    #[test]
    fn test_csv_becomes_table() {
        let file = read_bytes("orders.csv", b"sku,qty\nA1,4\nB2,7\n").unwrap();
        let Ingested::Table(table) = &file.content else {
            panic!("expected table, got {:?}", file.content);
        };
        assert_eq!(table.headers, vec!["sku", "qty"]);
        assert_eq!(file.content.prompt_text(), "sku,qty\nA1,4\nB2,7\n");
    }

    #[test]
    fn test_broken_csv_falls_back_to_text() {
        let file = read_bytes("bad.csv", b"a,\"unterminated\n1,2").unwrap();
        assert_eq!(
            file.content,
            Ingested::Text("a,\"unterminated\n1,2".to_string())
        );
    }

    #[test]
    fn test_broken_xlsx_falls_back_to_text() {
        let file = read_bytes("sheet.xlsx", b"not really a workbook").unwrap();
        assert_eq!(
            file.content,
            Ingested::Text("not really a workbook".to_string())
        );
    }

    #[test]
    fn test_xlsx_with_column_past_xfd_falls_back_to_text() {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("xl/worksheets/sheet1.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(br#"<worksheet><sheetData><row r="1"><c r="ZZZZZZ1"><v>1</v></c></row></sheetData></worksheet>"#)
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let file = read_bytes("a.xlsx", &bytes).unwrap();
        assert_eq!(
            file.content,
            Ingested::Text(String::from_utf8_lossy(&bytes).into_owned())
        );
    }

    #[test]
    fn test_invalid_docx_is_an_error() {
        assert!(read_bytes("memo.docx", b"not a docx").is_err());
    }

    #[test]
    fn test_text_preview_is_truncated() {
        let content = Ingested::Text("é".repeat(PREVIEW_CHARS * 2));
        assert_eq!(content.preview().chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_combine_separates_parts() {
        let files = vec![
            read_bytes("a.txt", b"first").unwrap(),
            read_bytes("b.csv", b"x,y\n1,2").unwrap(),
        ];
        assert_eq!(combine(&files), "first\n\nx,y\n1,2\n");
    }
}
