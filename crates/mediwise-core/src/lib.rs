//! MediWise Core Library
//!
//! Clinical document analysis: blood-count report classification and
//! prescription-to-inventory matching.
//!
//! # Architecture
//!
//! ```text
//!   CBC report image                         Prescription document
//!          │                                          │
//!          ▼                                          ▼
//!     OCR (tesseract)                         MedicineExtractor
//!          │                                 (template | text parser)
//!          ▼                                          │
//!    FieldExtractor                                   ▼
//!   (15 CBC biomarkers)                    InventoryMatcher ◀── inventory
//!          │                                          │        snapshot
//!   all zero? ──▶ UNREADABLE_DOCUMENT                 ▼
//!          │                                     MatchResult
//!          ▼                                 (matched / NOT_AVAILABLE)
//!   DiseaseClassifier ──▶ Recommendation               │
//!          │                                          ▼
//!          ▼                              upload status (one-shot)
//!   ClassificationResult
//! ```
//!
//! # Core Principle
//!
//! **Artifacts are loaded once and never mutated.** A missing model makes
//! the classifier permanently unavailable; nothing is reloaded or retried.
//!
//! # Modules
//!
//! - [`biomarkers`]: biomarker field extraction from report text
//! - [`classifier`]: tree-ensemble classifier and recommendation table
//! - [`extraction`]: medicine extractors behind one trait
//! - [`inventory`]: fuzzy inventory matcher
//! - [`db`]: read-only SQLite inventory source
//! - [`service`]: the boundary operations as one shared service
//! - [`config`], [`logging`]: TOML configuration and tracing setup

pub mod biomarkers;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use classifier::{ArtifactPaths, DiseaseClassifier};
pub use config::Config;
pub use db::Database;
pub use error::{AnalysisError, AnalysisResult, ErrorKind};
pub use extraction::{
    FixedExtractor, MedicineExtractor, PrescriptionTextExtractor, TemplateCatalogExtractor,
};
pub use inventory::{match_inventory, InventoryMatcher};
pub use models::{
    BiomarkerVector, ClassificationResult, ExtractedMedicineEntry, InventoryRecord,
    InventorySnapshot, MatchResult, PrescriptionDocument, PrescriptionUpload, UploadStatus,
};
pub use service::{AnalysisService, StartupError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use models::{MatchedEntry, UnmatchedEntry};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MediwiseError {
    #[error("OCR failure: {0}")]
    OcrFailure(String),

    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("No recommendation: {0}")]
    NoRecommendation(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<AnalysisError> for MediwiseError {
    fn from(e: AnalysisError) -> Self {
        let detail = e.to_string();
        match e {
            AnalysisError::OcrFailure(_) => MediwiseError::OcrFailure(detail),
            AnalysisError::UnreadableDocument => MediwiseError::UnreadableDocument(detail),
            AnalysisError::ModelUnavailable(_) => MediwiseError::ModelUnavailable(detail),
            AnalysisError::Prediction(_) => MediwiseError::PredictionError(detail),
            AnalysisError::NoRecommendation(_) => MediwiseError::NoRecommendation(detail),
            AnalysisError::Timeout(_) => MediwiseError::Timeout(detail),
        }
    }
}

impl From<db::DbError> for MediwiseError {
    fn from(e: db::DbError) -> Self {
        MediwiseError::DatabaseError(e.to_string())
    }
}

impl From<config::ConfigError> for MediwiseError {
    fn from(e: config::ConfigError) -> Self {
        MediwiseError::ConfigError(e.to_string())
    }
}

impl From<StartupError> for MediwiseError {
    fn from(e: StartupError) -> Self {
        MediwiseError::ConfigError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Build the analysis core from a TOML config file, or from `MEDIWISE_CONFIG`
/// (falling back to defaults) when no path is given.
#[uniffi::export]
pub fn open_core(config_path: Option<String>) -> Result<Arc<MediwiseCore>, MediwiseError> {
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::from_env()?,
    };
    logging::init_logging(&config.logging);

    let service = AnalysisService::from_config(&config)?;
    Ok(Arc::new(MediwiseCore {
        service: Arc::new(service),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe analysis service wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MediwiseCore {
    service: Arc<AnalysisService>,
}

impl MediwiseCore {
    /// Wrap an already built service.
    pub fn from_service(service: AnalysisService) -> Arc<Self> {
        Arc::new(Self {
            service: Arc::new(service),
        })
    }
}

#[uniffi::export]
impl MediwiseCore {
    // =========================================================================
    // Clinical Reports
    // =========================================================================

    /// OCR and classify a CBC report image.
    pub fn analyze_clinical_report(
        &self,
        image: Vec<u8>,
    ) -> Result<FfiClassificationResult, MediwiseError> {
        let result = self.service.analyze_clinical_report(&image)?;
        Ok(result.into())
    }

    /// Same as `analyze_clinical_report`, but gives up after `timeout_ms`.
    pub fn analyze_clinical_report_with_timeout(
        &self,
        image: Vec<u8>,
        timeout_ms: u64,
    ) -> Result<FfiClassificationResult, MediwiseError> {
        let deadline = std::time::Duration::from_millis(timeout_ms);
        let result = self.service.analyze_with_deadline(image, deadline)?;
        Ok(result.into())
    }

    /// Classify report text that was recognized elsewhere.
    pub fn analyze_report_text(&self, text: String) -> Result<FfiClassificationResult, MediwiseError> {
        let result = self.service.analyze_report_text(&text)?;
        Ok(result.into())
    }

    pub fn model_available(&self) -> bool {
        self.service.classifier().is_available()
    }

    // =========================================================================
    // Prescriptions
    // =========================================================================

    /// Extract medicine entries from prescription text and notes.
    pub fn extract_medicines(
        &self,
        text: String,
        notes: Option<String>,
        catalogue_hints: Vec<String>,
    ) -> Vec<FfiMedicineEntry> {
        let document = PrescriptionDocument {
            text,
            notes,
            catalogue_hints,
        };
        self.service
            .extract_medicines(&document)
            .into_iter()
            .map(|e| e.into())
            .collect()
    }

    /// Match entries against a read-only snapshot of the inventory database.
    pub fn match_inventory_from_db(
        &self,
        db_path: String,
        entries: Vec<FfiMedicineEntry>,
        seller_id: Option<i64>,
    ) -> Result<FfiMatchResult, MediwiseError> {
        let db = Database::open_read_only(&db_path)?;
        let snapshot = db.inventory_snapshot(seller_id)?;
        let entries: Vec<ExtractedMedicineEntry> = entries.into_iter().map(|e| e.into()).collect();

        let result = self.service.match_inventory(&entries, &snapshot, seller_id);
        Ok(result.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe classification result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClassificationResult {
    pub disease_label: String,
    pub confidence_percent: f64,
    /// Two decimals, e.g. "87.50"
    pub confidence_display: String,
    pub diet_advice: String,
    pub workout_advice: String,
    pub precautions: String,
    pub artifact_version: String,
}

impl From<ClassificationResult> for FfiClassificationResult {
    fn from(result: ClassificationResult) -> Self {
        Self {
            confidence_display: result.confidence_display(),
            disease_label: result.disease_label,
            confidence_percent: result.confidence_percent,
            diet_advice: result.diet_advice,
            workout_advice: result.workout_advice,
            precautions: result.precautions,
            artifact_version: result.artifact_version,
        }
    }
}

/// FFI-safe medicine entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineEntry {
    pub name: String,
    pub strength: Option<String>,
    pub dosage_frequency: Option<String>,
    pub duration_text: Option<String>,
    pub quantity_text: Option<String>,
    /// Derived: first integer of the quantity text, at least 1
    pub quantity: u32,
    /// Derived: stated duration or "7 days"
    pub course_duration: String,
}

impl From<ExtractedMedicineEntry> for FfiMedicineEntry {
    fn from(entry: ExtractedMedicineEntry) -> Self {
        Self {
            quantity: entry.quantity_count(),
            course_duration: entry.course_duration().to_string(),
            name: entry.name,
            strength: entry.strength,
            dosage_frequency: entry.dosage_frequency,
            duration_text: entry.duration_text,
            quantity_text: entry.quantity_text,
        }
    }
}

impl From<FfiMedicineEntry> for ExtractedMedicineEntry {
    fn from(entry: FfiMedicineEntry) -> Self {
        ExtractedMedicineEntry {
            name: entry.name,
            strength: entry.strength,
            dosage_frequency: entry.dosage_frequency,
            duration_text: entry.duration_text,
            quantity_text: entry.quantity_text,
        }
    }
}

/// FFI-safe inventory row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventoryRecord {
    pub record_id: i64,
    pub generic_name: String,
    pub brand_name: String,
    pub strength: String,
    pub stock_quantity: u32,
    pub unit_price: f64,
    pub seller_id: i64,
    pub seller_name: String,
}

impl From<InventoryRecord> for FfiInventoryRecord {
    fn from(record: InventoryRecord) -> Self {
        Self {
            record_id: record.record_id,
            generic_name: record.generic_name,
            brand_name: record.brand_name,
            strength: record.strength,
            stock_quantity: record.stock_quantity,
            unit_price: record.unit_price,
            seller_id: record.seller_id,
            seller_name: record.seller_name,
        }
    }
}

/// FFI-safe matched entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatchedEntry {
    pub entry: FfiMedicineEntry,
    pub record: FfiInventoryRecord,
}

impl From<MatchedEntry> for FfiMatchedEntry {
    fn from(matched: MatchedEntry) -> Self {
        Self {
            entry: matched.entry.into(),
            record: matched.record.into(),
        }
    }
}

/// FFI-safe unmatched entry. `code` is always `NOT_AVAILABLE`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUnmatchedEntry {
    pub entry: FfiMedicineEntry,
    pub code: String,
    pub reason: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl From<UnmatchedEntry> for FfiUnmatchedEntry {
    fn from(unmatched: UnmatchedEntry) -> Self {
        Self {
            entry: unmatched.entry.into(),
            code: ErrorKind::NotAvailable.code().to_string(),
            reason: unmatched.reason.as_str().to_string(),
            message: unmatched.reason.description().to_string(),
            suggestion: unmatched.suggestion,
        }
    }
}

/// FFI-safe match result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatchResult {
    pub matched: Vec<FfiMatchedEntry>,
    pub unmatched: Vec<FfiUnmatchedEntry>,
    /// Upload status implied by this result
    pub status: String,
    pub estimated_total: f64,
}

impl From<MatchResult> for FfiMatchResult {
    fn from(result: MatchResult) -> Self {
        Self {
            status: result.upload_status().as_str().to_string(),
            estimated_total: result.estimated_total(),
            matched: result.matched.into_iter().map(|m| m.into()).collect(),
            unmatched: result.unmatched.into_iter().map(|u| u.into()).collect(),
        }
    }
}
