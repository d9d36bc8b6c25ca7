//! Block rendering
//!
//! Maps classified blocks onto a [`DocumentBackend`] and serializes the result.

use tracing::debug;

use super::backend::{DocumentBackend, DocxBackend};
use super::classify::classify;
use super::models::{DocumentBlock, HeadingMode, LIST_BULLET_STYLE};
use crate::error::DocumentError;

/// Render blocks in order and serialize the backend's document.
///
/// Bullet items whose list style cannot be applied stay in the document as
/// plain paragraphs with the same text.
pub fn render<B: DocumentBackend>(
    blocks: &[DocumentBlock],
    mut backend: B,
) -> Result<Vec<u8>, DocumentError> {
    for (index, block) in blocks.iter().enumerate() {
        match block {
            DocumentBlock::Heading { level, text } => {
                backend.add_heading(text, *level);
            }
            DocumentBlock::BulletItem { text } => {
                let paragraph = backend.add_paragraph(text);
                if !backend.apply_style(paragraph, LIST_BULLET_STYLE) {
                    debug!(block = index, "list style unavailable, keeping plain paragraph");
                }
            }
            DocumentBlock::Paragraph { text } => {
                backend.add_paragraph(text);
            }
        }
    }

    backend.serialize()
}

/// Classify text and render it to `.docx` bytes with the default backend
pub fn text_to_docx(text: &str, mode: HeadingMode) -> Result<Vec<u8>, DocumentError> {
    let blocks = classify(text, mode);
    debug!(blocks = blocks.len(), ?mode, "rendering document");
    render(&blocks, DocxBackend::new())
}
