//! Text recognition for photographed and scanned clinical documents.
//!
//! This crate turns image bytes into plain text through the Tesseract
//! command-line engine. It knows nothing about what the text means.

pub mod engine;
pub mod locate;

pub use engine::*;
pub use locate::*;

use std::path::PathBuf;

use thiserror::Error;

/// Text recognition errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image could not be decoded: {0}")]
    UndecodableImage(String),

    #[error("Recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Recognition engine failed ({status}): {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Recognition engine not found at: {0}")]
    EngineNotFound(PathBuf),
}

pub type OcrResult<T> = Result<T, OcrError>;
