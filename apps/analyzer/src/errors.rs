#![allow(dead_code)]

use thiserror::Error;

use crate::extractor::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type for the analysis pipeline.
///
/// The API layer sitting above this crate is expected to translate input
/// errors (`is_input_error() == true`) into 4xx responses and everything
/// else into 5xx. Persistence failures never appear here; they are logged
/// and swallowed inside the analyzer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to parse resume file: {0}")]
    Extraction(#[from] ExtractError),

    #[error("resume analysis failed: {0}")]
    Llm(#[from] LlmError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the caller supplied something we could never act on:
    /// an unreadable/unsupported document or empty resume text. These are
    /// never retried.
    pub fn is_input_error(&self) -> bool {
        match self {
            AppError::Extraction(_) | AppError::Validation(_) => true,
            AppError::Llm(err) => matches!(err, LlmError::EmptyResumeText),
            AppError::Internal(_) => false,
        }
    }
}
