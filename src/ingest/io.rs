//! Container validation for uploaded Office files

use anyhow::{bail, Result};
use std::io::Cursor;
use zip::ZipArchive;

/// Validates that the bytes form a legitimate .docx package
pub(crate) fn validate_docx_bytes(name: &str, bytes: &[u8]) -> Result<()> {
    let Ok(mut archive) = ZipArchive::new(Cursor::new(bytes)) else {
        bail!(
            "{name} is not a valid .docx file: not a ZIP container\n\
            Legacy .doc files are not supported; save the document as .docx first."
        );
    };

    if archive.by_name("word/document.xml").is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            bail!("{name} appears to be an Excel workbook; rename it to .xlsx");
        }

        bail!(
            "Invalid .docx file {name}: missing word/document.xml\n\
            This file may be corrupted or is not a valid Word document."
        );
    }

    Ok(())
}
