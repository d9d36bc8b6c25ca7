//! Read-only queries over classified blocks
//!
//! Outline generation and document statistics.

use super::models::*;

const WORDS_PER_PAGE: f32 = 250.0;

pub fn generate_outline(blocks: &[DocumentBlock]) -> Vec<OutlineItem> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| match block {
            DocumentBlock::Heading { level, text } => Some(OutlineItem {
                title: text.trim().to_string(),
                level: *level,
                block_index: index,
            }),
            _ => None,
        })
        .collect()
}

impl DocumentStats {
    pub fn from_blocks(blocks: &[DocumentBlock]) -> Self {
        let mut stats = DocumentStats::default();

        for block in blocks {
            match block {
                DocumentBlock::Heading { .. } => stats.headings += 1,
                DocumentBlock::BulletItem { .. } => stats.bullets += 1,
                DocumentBlock::Paragraph { text } if text.trim().is_empty() => {
                    stats.blank_lines += 1
                }
                DocumentBlock::Paragraph { .. } => stats.paragraphs += 1,
            }
            stats.word_count += block.text().split_whitespace().count();
        }

        stats.page_count = estimate_page_count(stats.word_count);
        stats
    }
}

pub(crate) fn estimate_page_count(word_count: usize) -> usize {
    // Rough estimate: 250 words per page
    (word_count as f32 / WORDS_PER_PAGE).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::classify::classify;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "## Overview\nThe project starts now.\n\n### Risks\n- late data\n- scope creep";

    #[test]
    fn test_outline() {
        let blocks = classify(SAMPLE, HeadingMode::Markdown);
        let outline = generate_outline(&blocks);

        assert_eq!(
            outline,
            vec![
                OutlineItem {
                    title: "Overview".to_string(),
                    level: 2,
                    block_index: 0,
                },
                OutlineItem {
                    title: "Risks".to_string(),
                    level: 3,
                    block_index: 3,
                },
            ]
        );
    }

    #[test]
    fn test_stats() {
        let blocks = classify(SAMPLE, HeadingMode::Markdown);
        let stats = DocumentStats::from_blocks(&blocks);

        assert_eq!(
            stats,
            DocumentStats {
                headings: 2,
                bullets: 2,
                paragraphs: 1,
                blank_lines: 1,
                word_count: 10,
                page_count: 1,
            }
        );
    }

    #[test]
    fn test_page_estimate() {
        assert_eq!(estimate_page_count(0), 0);
        assert_eq!(estimate_page_count(250), 1);
        assert_eq!(estimate_page_count(251), 2);
    }
}
