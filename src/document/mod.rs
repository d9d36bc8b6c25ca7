//! Text-to-document conversion
//!
//! This module classifies plain text lines into document blocks, renders the
//! blocks into a Word document, and reads generated documents back.

pub mod backend;
pub mod classify;
pub mod models;
pub mod query;
pub mod reader;
pub mod render;

pub use backend::{DocumentBackend, DocxBackend, ParagraphRef};
pub use classify::{classify, classify_line};
pub use models::*;
pub use query::*;
pub use reader::{read_blocks, read_text};
pub use render::{render, text_to_docx};
