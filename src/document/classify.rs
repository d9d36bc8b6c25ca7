//! Line classification
//!
//! Each line is classified on its own content alone, so the text can be
//! processed as an independent pass per line.

use super::models::{DocumentBlock, HeadingMode};

const BULLET_CHARS: &[char] = &['•', '-', ' '];

/// Split text into lines and classify each one in order.
///
/// Splits on `\n` and keeps empty trailing segments, so the block count is
/// always the number of newline characters plus one.
pub fn classify(text: &str, mode: HeadingMode) -> Vec<DocumentBlock> {
    text.split('\n')
        .map(|line| classify_line(line.strip_suffix('\r').unwrap_or(line), mode))
        .collect()
}

/// Classify a single line under the given mode
pub fn classify_line(line: &str, mode: HeadingMode) -> DocumentBlock {
    match mode {
        HeadingMode::Freeform => classify_freeform(line),
        HeadingMode::Markdown => classify_markdown(line),
    }
}

fn classify_freeform(line: &str) -> DocumentBlock {
    let trimmed = line.trim();

    if line.trim_end().ends_with(':') && !line.starts_with(' ') {
        return DocumentBlock::Heading {
            level: 2,
            text: trimmed.to_string(),
        };
    }

    if trimmed.starts_with('•') || trimmed.starts_with("- ") {
        return DocumentBlock::BulletItem {
            text: trimmed.trim_start_matches(BULLET_CHARS).to_string(),
        };
    }

    DocumentBlock::Paragraph {
        text: line.to_string(),
    }
}

fn classify_markdown(line: &str) -> DocumentBlock {
    if let Some(rest) = line.strip_prefix("## ") {
        DocumentBlock::Heading {
            level: 2,
            text: rest.to_string(),
        }
    } else if let Some(rest) = line.strip_prefix("### ") {
        DocumentBlock::Heading {
            level: 3,
            text: rest.to_string(),
        }
    } else if let Some(rest) = line.strip_prefix("- ") {
        DocumentBlock::BulletItem {
            text: rest.to_string(),
        }
    } else {
        DocumentBlock::Paragraph {
            text: line.to_string(),
        }
    }
}
