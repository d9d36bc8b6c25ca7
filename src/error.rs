//! Error types for document building and LLM access

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// The backend could not produce document bytes
    #[error("failed to serialize document: {0}")]
    Serialization(String),

    #[error("failed to read .docx: {0}")]
    Read(#[from] docx_rs::ReaderError),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (pass --api-key, set OPENAI_API_KEY, or add api_key to the config file)")]
    MissingApiKey,

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM response contained no text")]
    EmptyResponse,
}
