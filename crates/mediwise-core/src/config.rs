//! Runtime configuration loaded from TOML.
//!
//! Every section is optional; missing keys take their defaults.

use std::path::{Path, PathBuf};

use mediwise_ocr::{EngineLocation, DEFAULT_PAGE_SEGMENTATION_MODE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{
    ArtifactPaths, DEFAULT_LABELS_FILE, DEFAULT_MODEL_FILE, DEFAULT_RECOMMENDATIONS_FILE,
};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MEDIWISE_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub artifacts: ArtifactsConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    /// "auto" or an explicit path to the tesseract binary
    pub engine: EngineLocation,
    pub language: String,
    pub page_segmentation_mode: u8,
    /// Fail startup instead of deferring the failure to the first OCR call
    pub require_engine: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: EngineLocation::Auto,
            language: "eng".to_string(),
            page_segmentation_mode: DEFAULT_PAGE_SEGMENTATION_MODE,
            require_engine: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub model: String,
    pub labels: String,
    pub recommendations: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ml"),
            model: DEFAULT_MODEL_FILE.to_string(),
            labels: DEFAULT_LABELS_FILE.to_string(),
            recommendations: DEFAULT_RECOMMENDATIONS_FILE.to_string(),
        }
    }
}

impl ArtifactsConfig {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.dir.join(&self.model),
            labels: self.dir.join(&self.labels),
            recommendations: self.dir.join(&self.recommendations),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Catalogue templates with random selection
    #[default]
    Template,
    /// Line parser over prescription text
    Text,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mediwise_core=info,mediwise_ocr=info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the file named by `MEDIWISE_CONFIG`, or defaults when unset.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ocr.engine, EngineLocation::Auto);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.page_segmentation_mode, 6);
        assert_eq!(config.extraction.mode, ExtractionMode::Template);
        assert_eq!(
            config.artifacts.paths().model,
            PathBuf::from("ml").join("medical_model.json")
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [ocr]
            engine = "/opt/tesseract/bin/tesseract"
            require_engine = true

            [artifacts]
            dir = "/srv/models"

            [extraction]
            mode = "text"
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(
            config.ocr.engine,
            EngineLocation::Path(PathBuf::from("/opt/tesseract/bin/tesseract"))
        );
        assert!(config.ocr.require_engine);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(
            config.artifacts.paths().labels,
            PathBuf::from("/srv/models/label_encoder.json")
        );
        assert_eq!(config.extraction.mode, ExtractionMode::Text);
        assert_eq!(config.extraction.seed, Some(42));
        assert!(!config.logging.json);
    }

    #[test]
    fn test_unknown_mode_is_error() {
        let result = Config::from_toml_str("[extraction]\nmode = \"ml\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mediwise.toml");
        std::fs::write(&path, "[logging]\njson = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "mediwise_core=info,mediwise_ocr=info");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
