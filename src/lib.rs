//! projdoc: turn stakeholder notes and supporting files into a Word project document
//!
//! This library classifies plain text line by line into headings, bullet
//! items and paragraphs, renders the result as a .docx file, and provides the
//! ingestion, prompt and LLM plumbing used by the `projdoc` command.

pub mod config;
pub mod document;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod prompt;

// Re-export commonly used types
pub use config::Config;
pub use document::{classify, classify_line, render, text_to_docx, DocumentBlock, HeadingMode};
pub use error::{DocumentError, LlmError};
