//! Recognition engine location.
//!
//! Resolution order:
//! 1. Explicit path from configuration
//! 2. `TESSERACT_CMD` environment override
//! 3. Well-known install locations for the current OS
//! 4. Every directory on `PATH`

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable that overrides the engine path.
pub const ENGINE_ENV_OVERRIDE: &str = "TESSERACT_CMD";

#[cfg(windows)]
const ENGINE_BINARY: &str = "tesseract.exe";
#[cfg(not(windows))]
const ENGINE_BINARY: &str = "tesseract";

/// Configured engine location: `"auto"` or an explicit path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineLocation {
    #[default]
    Auto,
    Path(PathBuf),
}

impl From<String> for EngineLocation {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            EngineLocation::Auto
        } else {
            EngineLocation::Path(PathBuf::from(trimmed))
        }
    }
}

impl From<EngineLocation> for String {
    fn from(value: EngineLocation) -> Self {
        match value {
            EngineLocation::Auto => "auto".into(),
            EngineLocation::Path(p) => p.display().to_string(),
        }
    }
}

/// Where a resolved engine path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Configuration,
    Environment,
    WellKnownLocation,
    SearchPath,
    Unresolved,
}

impl fmt::Display for ResolvedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolvedFrom::Configuration => "configuration",
            ResolvedFrom::Environment => "environment override",
            ResolvedFrom::WellKnownLocation => "well-known install location",
            ResolvedFrom::SearchPath => "PATH",
            ResolvedFrom::Unresolved => "unresolved",
        };
        f.write_str(s)
    }
}

/// Outcome of engine location, computed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResolution {
    pub path: Option<PathBuf>,
    pub source: ResolvedFrom,
    /// Human-readable explanation, reused as the error text when unresolved.
    pub diagnostic: String,
}

impl EngineResolution {
    pub fn is_resolved(&self) -> bool {
        self.path.is_some()
    }

    fn found(path: PathBuf, source: ResolvedFrom) -> Self {
        let diagnostic = format!("using {} from {}", path.display(), source);
        Self {
            path: Some(path),
            source,
            diagnostic,
        }
    }

    fn unresolved(diagnostic: String) -> Self {
        Self {
            path: None,
            source: ResolvedFrom::Unresolved,
            diagnostic,
        }
    }
}

/// Probes the filesystem for the recognition engine.
#[derive(Debug, Clone)]
pub struct EngineLocator {
    well_known: Vec<PathBuf>,
    search_path: Option<OsString>,
    env_override: Option<PathBuf>,
}

impl EngineLocator {
    /// Locator using the real environment of this process.
    pub fn system() -> Self {
        Self {
            well_known: default_well_known_locations(),
            search_path: env::var_os("PATH"),
            env_override: env::var_os(ENGINE_ENV_OVERRIDE)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Locator with explicit probe inputs (for testing).
    pub fn with_probes(
        well_known: Vec<PathBuf>,
        search_path: Option<OsString>,
        env_override: Option<PathBuf>,
    ) -> Self {
        Self {
            well_known,
            search_path,
            env_override,
        }
    }

    /// Resolve the engine binary for the given configured location.
    pub fn resolve(&self, location: &EngineLocation) -> EngineResolution {
        let resolution = self.probe(location);
        match &resolution.path {
            Some(_) => info!(source = %resolution.source, "OCR engine: {}", resolution.diagnostic),
            None => warn!("OCR engine: {}", resolution.diagnostic),
        }
        resolution
    }

    fn probe(&self, location: &EngineLocation) -> EngineResolution {
        if let EngineLocation::Path(configured) = location {
            if configured.is_file() {
                return EngineResolution::found(configured.clone(), ResolvedFrom::Configuration);
            }
            // An explicit path that is wrong is a configuration mistake; don't paper over it.
            return EngineResolution::unresolved(format!(
                "configured engine path {} does not exist",
                configured.display()
            ));
        }

        if let Some(over) = &self.env_override {
            if over.is_file() {
                return EngineResolution::found(over.clone(), ResolvedFrom::Environment);
            }
            warn!(
                path = %over.display(),
                "{} is set but does not point to a file, continuing search",
                ENGINE_ENV_OVERRIDE
            );
        }

        if let Some(found) = self.well_known.iter().find(|p| p.is_file()) {
            return EngineResolution::found(found.clone(), ResolvedFrom::WellKnownLocation);
        }

        if let Some(found) = self.search_path_lookup() {
            return EngineResolution::found(found, ResolvedFrom::SearchPath);
        }

        EngineResolution::unresolved(format!(
            "{} not found in well-known locations or on PATH; set ocr.engine or {}",
            ENGINE_BINARY, ENGINE_ENV_OVERRIDE
        ))
    }

    fn search_path_lookup(&self) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        env::split_paths(paths)
            .map(|dir| dir.join(ENGINE_BINARY))
            .find(|candidate| candidate.is_file())
    }
}

/// Resolve the engine against the real process environment.
pub fn resolve_engine(location: &EngineLocation) -> EngineResolution {
    EngineLocator::system().resolve(location)
}

fn default_well_known_locations() -> Vec<PathBuf> {
    if cfg!(windows) {
        let mut paths = vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"),
            PathBuf::from(r"D:\Program Files\Tesseract-OCR\tesseract.exe"),
        ];
        if let Some(local) = env::var_os("LOCALAPPDATA") {
            paths.push(Path::new(&local).join("Tesseract-OCR").join("tesseract.exe"));
        }
        paths
    } else {
        vec![
            PathBuf::from("/usr/bin/tesseract"),
            PathBuf::from("/usr/local/bin/tesseract"),
            PathBuf::from("/opt/homebrew/bin/tesseract"),
            PathBuf::from("/opt/local/bin/tesseract"),
        ]
    }
}
