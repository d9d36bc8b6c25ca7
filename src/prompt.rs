//! Prompt assembly for project document generation

use crate::document::HeadingMode;

const NONE_PLACEHOLDER: &str = "(none)";

const TEMPLATE: &str = r#"You are an expert in supply chain business strategy and technical data systems.
Write a clean, publication-ready project document for a supply chain initiative using the
inputs below (meeting notes, project documentation, discussions and tabular data samples).
The document must be usable by executives and technical teams alike.

GAP DETECTION AND EXPERT SUGGESTIONS
• Identify missing or weak elements such as definitions, KPIs, targets, governance, controls,
  non-functional requirements and risks.
• Where inputs are incomplete, add an "Expert Suggestions" subsection in the relevant part of
  the document. Each suggestion must be practical and tied to a measurable impact (time saved,
  cost avoided, revenue protected, working capital, service level).
• Where useful, offer alternative design options with their trade-offs.

DATA RULES
Use only facts present in the inputs and never invent numbers. State assumptions and data gaps
explicitly. Give KPI formulas in plain text. When inputs conflict, show both values and
recommend how to resolve the conflict.

DOCUMENT STRUCTURE (in this order)
Title Page
Executive Summary
Section A: Business Priorities (overview, problem statements, KPI definitions and targets,
business case, resolution strategy, milestones and ownership, anticipated impact)
Section B: Execution Plan (data scope and grain, source systems, target data model,
transformations and business rules, pipeline design, reporting design, non-functional
requirements, risks and mitigations, phased implementation plan)
Appendices (glossary, assumptions, sample calculations, source notes)
Refinement Notes: five concise questions tailored to the initiative.

FORMATTING
{formatting}

Produce only the document content, with no commentary before or after it.

=== INPUT START ===
Notes: {notes}

Uploaded Files (combined text or table samples):
{files}

Focus:
{focus}
=== INPUT END ===
"#;

const FREEFORM_FORMATTING: &str = "\
• Put every heading on its own line, starting at the left margin and ending with a colon.
• Start every list item with \"• \" and never end a list item with a colon.
• Do not use markdown syntax, code fences, emojis, hashtags or asterisks.";

const MARKDOWN_FORMATTING: &str = "\
• Start section headings with \"## \" and subsection headings with \"### \".
• Start every list item with \"- \" at the left margin.
• Do not use any other markdown syntax, code fences, emojis or asterisks.";

/// User-supplied inputs to the prompt
#[derive(Debug, Clone, Default)]
pub struct PromptInputs {
    pub notes: String,
    pub file_text: String,
    pub focus: String,
}

/// Fill the project document template for the given heading convention
pub fn build_prompt(inputs: &PromptInputs, mode: HeadingMode) -> String {
    let formatting = match mode {
        HeadingMode::Freeform => FREEFORM_FORMATTING,
        HeadingMode::Markdown => MARKDOWN_FORMATTING,
    };

    fill(
        TEMPLATE,
        &[
            ("formatting", formatting),
            ("notes", inputs.notes.as_str()),
            ("files", or_placeholder(&inputs.file_text)),
            ("focus", or_placeholder(&inputs.focus)),
        ],
    )
}

/// Substitute `{name}` placeholders in a single pass over the template,
/// so substituted values are never scanned for placeholders themselves.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });

        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        NONE_PLACEHOLDER
    } else {
        value
    }
}
