//! Word document backends
//!
//! The renderer talks to a [`DocumentBackend`]; [`DocxBackend`] is the
//! implementation that produces `.docx` bytes through docx-rs.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, SpecialIndentType, Start, Style, StyleType,
};

use super::models::LIST_BULLET_STYLE;
use crate::error::DocumentError;

const BULLET_NUMBERING_ID: usize = 1;

/// Handle to a paragraph previously added to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphRef(pub usize);

/// Target of block rendering
pub trait DocumentBackend {
    fn add_heading(&mut self, text: &str, level: u8) -> ParagraphRef;

    fn add_paragraph(&mut self, text: &str) -> ParagraphRef;

    /// Apply a named paragraph style if the backend supports it.
    ///
    /// Returns `false` and leaves the paragraph untouched when the style
    /// cannot be applied.
    fn apply_style(&mut self, paragraph: ParagraphRef, style_name: &str) -> bool;

    fn serialize(self) -> Result<Vec<u8>, DocumentError>;
}

/// Paragraph styles registered with generated documents: (id, name, size in half-points)
const PARAGRAPH_STYLES: &[(&str, &str, usize)] = &[
    ("Heading2", "Heading 2", 28),
    ("Heading3", "Heading 3", 24),
    ("ListBullet", LIST_BULLET_STYLE, 22),
];

/// docx-rs backed document builder
pub struct DocxBackend {
    paragraphs: Vec<Paragraph>,
    list_styles: bool,
}

impl Default for DocxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBackend {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            list_styles: true,
        }
    }

    /// A backend that refuses list styling, so bullets render as plain paragraphs
    pub fn without_list_styles() -> Self {
        Self {
            paragraphs: Vec::new(),
            list_styles: false,
        }
    }

    fn push(&mut self, paragraph: Paragraph) -> ParagraphRef {
        self.paragraphs.push(paragraph);
        ParagraphRef(self.paragraphs.len() - 1)
    }

    fn supports_style(&self, style_id: &str) -> bool {
        if style_id == "ListBullet" && !self.list_styles {
            return false;
        }
        PARAGRAPH_STYLES.iter().any(|(id, _, _)| *id == style_id)
    }

    fn build(self) -> Docx {
        let mut docx = Docx::new();

        for (id, name, size) in PARAGRAPH_STYLES {
            let style = Style::new(*id, StyleType::Paragraph).name(*name).size(*size);
            let style = if id.starts_with("Heading") {
                style.bold()
            } else {
                style
            };
            docx = docx.add_style(style);
        }

        if self.list_styles {
            docx = docx
                .add_abstract_numbering(
                    AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
                        Level::new(
                            0,
                            Start::new(1),
                            NumberFormat::new("bullet"),
                            LevelText::new("•"),
                            LevelJc::new("left"),
                        )
                        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
                    ),
                )
                .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));
        }

        for paragraph in self.paragraphs {
            docx = docx.add_paragraph(paragraph);
        }

        docx
    }
}

impl DocumentBackend for DocxBackend {
    fn add_heading(&mut self, text: &str, level: u8) -> ParagraphRef {
        // Blocks only carry levels 2 and 3
        let style_id = format!("Heading{}", level.clamp(2, 3));
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_text(text))
                .style(&style_id),
        )
    }

    fn add_paragraph(&mut self, text: &str) -> ParagraphRef {
        self.push(Paragraph::new().add_run(Run::new().add_text(text)))
    }

    fn apply_style(&mut self, paragraph: ParagraphRef, style_name: &str) -> bool {
        let style_id: String = style_name.split_whitespace().collect();
        if !self.supports_style(&style_id) {
            return false;
        }

        let Some(slot) = self.paragraphs.get_mut(paragraph.0) else {
            return false;
        };

        let mut styled = std::mem::replace(slot, Paragraph::new()).style(&style_id);
        if style_id == "ListBullet" {
            styled = styled.numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0));
        }
        *slot = styled;
        true
    }

    fn serialize(self) -> Result<Vec<u8>, DocumentError> {
        let mut buffer = Cursor::new(Vec::new());
        self.build()
            .build()
            .pack(&mut buffer)
            .map_err(|e| DocumentError::Serialization(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}
