//! Recognition engines.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::GenericImageView;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::locate::EngineResolution;
use crate::{OcrError, OcrResult};

/// Page segmentation mode 6: assume a single uniform block of text.
pub const DEFAULT_PAGE_SEGMENTATION_MODE: u8 = 6;

/// Image-to-text abstraction.
///
/// Implementations must be safe to call from several threads at once.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in an encoded image (PNG, JPEG, TIFF, BMP).
    fn recognize(&self, image: &[u8]) -> OcrResult<String>;

    /// Recognize the text in an image file.
    fn recognize_file(&self, path: &Path) -> OcrResult<String> {
        let bytes = std::fs::read(path)?;
        self.recognize(&bytes)
    }
}

/// Check that the bytes are a decodable image before handing them to an engine.
pub fn ensure_decodable(image: &[u8]) -> OcrResult<()> {
    if image.is_empty() {
        return Err(OcrError::UndecodableImage("empty input".into()));
    }
    let decoded = image::load_from_memory(image)
        .map_err(|e| OcrError::UndecodableImage(e.to_string()))?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "image decoded"
    );
    Ok(())
}

/// Tesseract invoked as an external process.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: Option<PathBuf>,
    /// Explanation carried into every call when the binary is unresolved.
    unavailable_reason: String,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractEngine {
    /// Build from a startup-time resolution. An unresolved engine is still
    /// constructed; each call then fails with `EngineUnavailable`.
    pub fn new(resolution: &EngineResolution) -> Self {
        Self {
            binary: resolution.path.clone(),
            unavailable_reason: resolution.diagnostic.clone(),
            language: "eng".into(),
            page_segmentation_mode: DEFAULT_PAGE_SEGMENTATION_MODE,
        }
    }

    /// Set language(s), e.g. "eng" or "eng+fra".
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_page_segmentation_mode(mut self, psm: u8) -> Self {
        self.page_segmentation_mode = psm;
        self
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn binary_or_err(&self) -> OcrResult<&Path> {
        let binary = self
            .binary
            .as_deref()
            .ok_or_else(|| OcrError::EngineUnavailable(self.unavailable_reason.clone()))?;
        if !binary.is_file() {
            return Err(OcrError::EngineNotFound(binary.to_path_buf()));
        }
        Ok(binary)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &[u8]) -> OcrResult<String> {
        let binary = self.binary_or_err()?;
        ensure_decodable(image)?;

        // Each call gets its own temp file, so concurrent calls never share input.
        let mut input = NamedTempFile::new()?;
        input.write_all(image)?;
        input.flush()?;

        let output = Command::new(binary)
            .arg(input.path())
            .arg("stdout")
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| OcrError::EngineUnavailable(format!("{}: {}", binary.display(), e)))?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!("OCR finished. Extracted {} characters.", text.len());
        Ok(text)
    }
}

/// Mock engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    outcome: Result<String, String>,
    check_image: bool,
}

impl MockOcrEngine {
    /// Always returns `text`.
    pub fn new(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            check_image: false,
        }
    }

    /// Always fails as an unavailable engine.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            check_image: false,
        }
    }

    /// Also reject input that is not a decodable image.
    pub fn decoding_images(mut self) -> Self {
        self.check_image = true;
        self
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, image: &[u8]) -> OcrResult<String> {
        if self.check_image {
            ensure_decodable(image)?;
        }
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(OcrError::EngineUnavailable(reason.clone())),
        }
    }
}
