//! Core data structures for document representation
//!
//! This module defines the block types produced by line classification,
//! the classification modes, and the summary types derived from a block list.

use serde::{Deserialize, Serialize};

/// Style name applied to bullet paragraphs
pub const LIST_BULLET_STYLE: &str = "List Bullet";

/// Line classification convention used by the text producer
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingMode {
    /// Headings end with a colon, bullets start with `•` or `- `
    #[default]
    #[value(name = "freeform", alias = "freeform-heading")]
    Freeform,
    /// Headings start with `## ` or `### `, bullets start with `- `
    #[value(name = "markdown", alias = "markdown-heading")]
    Markdown,
}

/// One classified line of output document structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentBlock {
    Heading { level: u8, text: String },
    BulletItem { text: String },
    Paragraph { text: String },
}

impl DocumentBlock {
    pub fn text(&self) -> &str {
        match self {
            DocumentBlock::Heading { text, .. }
            | DocumentBlock::BulletItem { text }
            | DocumentBlock::Paragraph { text } => text,
        }
    }

    /// True for blocks that carry visible text
    pub fn has_text(&self) -> bool {
        !self.text().trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub title: String,
    pub level: u8,
    pub block_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub headings: usize,
    pub bullets: usize,
    pub paragraphs: usize,
    pub blank_lines: usize,
    pub word_count: usize,
    pub page_count: usize,
}
