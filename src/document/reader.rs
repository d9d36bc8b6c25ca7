//! Reading `.docx` content back into blocks
//!
//! Paragraph styles written by [`DocxBackend`](super::backend::DocxBackend)
//! map back to block kinds; paragraphs from other producers fall back to
//! Word's heading style conventions and list numbering.

use super::models::DocumentBlock;
use crate::error::DocumentError;

/// Parse `.docx` bytes into one block per body paragraph
pub fn read_blocks(bytes: &[u8]) -> Result<Vec<DocumentBlock>, DocumentError> {
    let docx = docx_rs::read_docx(bytes)?;

    let blocks = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_to_block(para)),
            _ => None,
        })
        .collect();

    Ok(blocks)
}

/// Plain text of every non-blank body paragraph, one per line
pub fn read_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let lines: Vec<String> = read_blocks(bytes)?
        .into_iter()
        .filter(DocumentBlock::has_text)
        .map(|block| block.text().to_string())
        .collect();
    Ok(lines.join("\n"))
}

fn paragraph_to_block(para: &docx_rs::Paragraph) -> DocumentBlock {
    let text = extract_paragraph_text(para);

    if let Some(level) = heading_level_from_style(para) {
        return DocumentBlock::Heading { level, text };
    }

    let is_bullet = para.property.numbering_property.is_some()
        || para
            .property
            .style
            .as_ref()
            .is_some_and(|style| style.val.replace(' ', "").eq_ignore_ascii_case("ListBullet"));

    if is_bullet {
        DocumentBlock::BulletItem { text }
    } else {
        DocumentBlock::Paragraph { text }
    }
}

/// Heading level from a `HeadingN` paragraph style, folded into levels 2 and 3
fn heading_level_from_style(para: &docx_rs::Paragraph) -> Option<u8> {
    let style = para.property.style.as_ref()?;
    let rest = style
        .val
        .strip_prefix("Heading")
        .or_else(|| style.val.strip_prefix("heading"))?;

    match rest.trim().parse::<u8>() {
        Ok(level) => Some(level.clamp(2, 3)),
        Err(_) if rest.is_empty() => Some(2),
        Err(_) => None,
    }
}

fn extract_paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => extract_run_text(run, &mut text),
            docx_rs::ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = child {
                        extract_run_text(run, &mut text);
                    }
                }
            }
            // Tracked deletions are not part of the visible text
            _ => {}
        }
    }

    text
}

fn extract_run_text(run: &docx_rs::Run, text: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(t) => text.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => text.push('\t'),
            docx_rs::RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
