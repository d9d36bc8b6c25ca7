//! Minimal reader for the first worksheet of an .xlsx workbook
//!
//! Only cell values are read: shared strings, inline strings, booleans and
//! raw numeric text. Formulas contribute their cached value.

use anyhow::{anyhow, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKSHEET_DIR: &str = "xl/worksheets/";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// Last column Excel allows (XFD)
const MAX_COLUMN: usize = 16_383;

/// Read all rows of the first worksheet
pub(crate) fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("not a ZIP container")?;

    let shared = match read_entry(&mut archive, SHARED_STRINGS) {
        Ok(xml) => parse_shared_strings(&xml)?,
        Err(_) => Vec::new(),
    };

    let sheet_name = match first_sheet_from_workbook(&mut archive)? {
        Some(name) => name,
        None => first_sheet_by_file_name(&archive)
            .ok_or_else(|| anyhow!("workbook has no sheets"))?,
    };
    let sheet = read_entry(&mut archive, &sheet_name)
        .with_context(|| format!("reading worksheet {sheet_name}"))?;

    parse_sheet(&sheet, &shared)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Path of the first tab listed in `workbook.xml`, resolved through its relationships.
///
/// Returns `None` when the workbook or its relationships part is missing.
fn first_sheet_from_workbook(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Option<String>> {
    let (Ok(workbook), Ok(rels)) = (
        read_entry(archive, WORKBOOK),
        read_entry(archive, WORKBOOK_RELS),
    ) else {
        return Ok(None);
    };

    let Some(rel_id) = first_sheet_rel_id(&workbook)? else {
        return Ok(None);
    };
    let Some(target) = relationship_target(&rels, &rel_id)? else {
        return Ok(None);
    };

    // Targets are relative to xl/ unless absolute within the package
    let path = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    };
    Ok(Some(path))
}

fn first_sheet_rel_id(workbook: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(workbook);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    // r:id; sheetId has a different local name
                    if attr.key.local_name().as_ref() == b"id" {
                        return Ok(Some(attr.unescape_value()?.into_owned()));
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_target(rels: &str, rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(rels);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn first_sheet_by_file_name(archive: &ZipArchive<Cursor<&[u8]>>) -> Option<String> {
    let mut sheets: Vec<&str> = archive
        .file_names()
        .filter(|name| name.starts_with(WORKSHEET_DIR) && name.ends_with(".xml"))
        .filter(|name| !name[WORKSHEET_DIR.len()..].contains('/'))
        .collect();

    // sheet1.xml, sheet2.xml, ... sheet10.xml in numeric order
    sheets.sort_by_key(|name| {
        let digits: String = name.chars().filter(char::is_ascii_digit).collect();
        (digits.parse::<u32>().unwrap_or(u32::MAX), name.to_string())
    });
    sheets.first().map(|name| name.to_string())
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"si" => current.clear(),
            Event::End(ref e) if e.local_name().as_ref() == b"si" => {
                strings.push(std::mem::take(&mut current));
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(ref e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::Text(ref e) if in_text => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

#[derive(Default)]
struct CellState {
    column: Option<usize>,
    kind: Option<String>,
    value: String,
}

fn parse_sheet(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<CellState> = None;
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"row" => row.clear(),
            Event::End(ref e) if e.local_name().as_ref() == b"row" => {
                rows.push(std::mem::take(&mut row));
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"row" => rows.push(Vec::new()),
            Event::Start(ref e) if e.local_name().as_ref() == b"c" => {
                cell = Some(start_cell(e)?);
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"c" => {
                let state = start_cell(e)?;
                place_cell(&mut row, state.column, String::new());
            }
            Event::End(ref e) if e.local_name().as_ref() == b"c" => {
                if let Some(state) = cell.take() {
                    let value = resolve_value(&state, shared);
                    place_cell(&mut row, state.column, value);
                }
            }
            Event::Start(ref e) if matches!(e.local_name().as_ref(), b"v" | b"t") => {
                in_value = cell.is_some();
            }
            Event::End(ref e) if matches!(e.local_name().as_ref(), b"v" | b"t") => {
                in_value = false;
            }
            Event::Text(ref e) if in_value => {
                if let Some(state) = cell.as_mut() {
                    state.value.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn start_cell(e: &BytesStart) -> Result<CellState> {
    let mut state = CellState::default();
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => state.column = column_index(&attr.unescape_value()?)?,
            b"t" => state.kind = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(state)
}

fn resolve_value(state: &CellState, shared: &[String]) -> String {
    match state.kind.as_deref() {
        Some("s") => state
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| shared.get(index).cloned())
            .unwrap_or_default(),
        Some("b") => match state.value.trim() {
            "1" => "TRUE".to_string(),
            _ => "FALSE".to_string(),
        },
        _ => state.value.clone(),
    }
}

fn place_cell(row: &mut Vec<String>, column: Option<usize>, value: String) {
    let index = column.unwrap_or(row.len());
    if index >= row.len() {
        row.resize(index + 1, String::new());
    }
    row[index] = value;
}

/// Zero-based column index from a cell reference such as `AB12`.
///
/// References without letters give `None`; columns past XFD are an error.
fn column_index(reference: &str) -> Result<Option<usize>> {
    let letters: Vec<char> = reference
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    if letters.is_empty() {
        return Ok(None);
    }

    let mut index = 0usize;
    for c in &letters {
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|i| *i - 1 <= MAX_COLUMN)
            .ok_or_else(|| anyhow!("cell reference {reference} is beyond column XFD"))?;
    }
    Ok(Some(index - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn build_workbook(shared: &str, sheet: &str) -> Vec<u8> {
        build_package(&[
            (WORKBOOK, "<workbook/>"),
            (SHARED_STRINGS, shared),
            ("xl/worksheets/sheet1.xml", sheet),
        ])
    }

    fn single_cell_sheet(reference: &str, text: &str) -> String {
        format!(
            r#"<worksheet><sheetData><row r="1"><c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c></row></sheetData></worksheet>"#
        )
    }

    const SHARED: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<si><t>Plant</t></si><si><t>On-time %</t></si><si><r><t>North</t></r><r><t> &amp; East</t></r></si>
</sst>"#;

    const SHEET: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="C2"><v>0.93</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>South</t></is></c><c r="B3" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;

    #[test]
    fn test_read_first_sheet() {
        let rows = read_first_sheet(&build_workbook(SHARED, SHEET)).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Plant".to_string(), "On-time %".to_string()],
                vec!["North & East".to_string(), String::new(), "0.93".to_string()],
                vec!["South".to_string(), "TRUE".to_string()],
            ]
        );
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1").unwrap(), Some(0));
        assert_eq!(column_index("Z9").unwrap(), Some(25));
        assert_eq!(column_index("AA10").unwrap(), Some(26));
        assert_eq!(column_index("XFD1").unwrap(), Some(MAX_COLUMN));
        assert_eq!(column_index("12").unwrap(), None);
    }

    #[test]
    fn test_column_beyond_xfd_is_rejected() {
        assert!(column_index("XFE1").is_err());
        assert!(column_index("ZZZZZZ1").is_err());
        assert!(column_index(&format!("{}1", "Z".repeat(40))).is_err());

        let sheet = single_cell_sheet("ZZZZZZ1", "far away");
        let bytes = build_package(&[("xl/worksheets/sheet1.xml", sheet.as_str())]);
        assert!(read_first_sheet(&bytes).is_err());
    }

    #[test]
    fn test_first_sheet_follows_workbook_order() {
        let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>
<sheet name="Data" sheetId="2" r:id="rId2"/><sheet name="Old" sheetId="1" r:id="rId1"/>
</sheets></workbook>"#;
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;
        let old = single_cell_sheet("A1", "OLD");
        let data = single_cell_sheet("A1", "DATA");

        let bytes = build_package(&[
            (WORKBOOK, workbook),
            (WORKBOOK_RELS, rels),
            ("xl/worksheets/sheet1.xml", old.as_str()),
            ("xl/worksheets/sheet2.xml", data.as_str()),
        ]);

        assert_eq!(read_first_sheet(&bytes).unwrap(), vec![vec!["DATA".to_string()]]);
    }

    #[test]
    fn test_missing_relationships_fall_back_to_file_order() {
        let second = single_cell_sheet("A1", "SECOND");
        let first = single_cell_sheet("A1", "FIRST");
        let bytes = build_package(&[
            ("xl/worksheets/sheet10.xml", second.as_str()),
            ("xl/worksheets/sheet2.xml", first.as_str()),
        ]);

        assert_eq!(read_first_sheet(&bytes).unwrap(), vec![vec!["FIRST".to_string()]]);
    }

    #[test]
    fn test_not_a_workbook() {
        assert!(read_first_sheet(b"plain text").is_err());
    }
}
