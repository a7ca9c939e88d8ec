//! Analysis service: the boundary operations, built once and shared.
//!
//! ```text
//! image ─▶ OcrEngine ─▶ FieldExtractor ─▶ DiseaseClassifier ─▶ ClassificationResult
//! document ─▶ MedicineExtractor ─▶ InventoryMatcher(snapshot) ─▶ MatchResult
//! ```
//!
//! The service holds no mutable state; wrap it in an `Arc` and call it from
//! any number of threads.

use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use mediwise_ocr::{resolve_engine, OcrEngine, TesseractEngine};
use thiserror::Error;
use tracing::{info, warn};

use crate::biomarkers::FieldExtractor;
use crate::classifier::DiseaseClassifier;
use crate::config::{Config, ConfigError, ExtractionMode};
use crate::error::{AnalysisError, AnalysisResult};
use crate::extraction::{MedicineExtractor, PrescriptionTextExtractor, TemplateCatalogExtractor};
use crate::inventory::match_inventory;
use crate::models::{
    BiomarkerVector, ClassificationResult, ExtractedMedicineEntry, InventorySnapshot, MatchResult,
    PrescriptionDocument, PrescriptionUpload, SellerId, UploadError, UploadStatus,
};

/// Failures while building the service.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Recognition engine required but not resolved: {0}")]
    EngineRequired(String),
}

pub struct AnalysisService {
    ocr: Box<dyn OcrEngine>,
    fields: FieldExtractor,
    classifier: DiseaseClassifier,
    extractor: Box<dyn MedicineExtractor>,
}

impl AnalysisService {
    pub fn new(
        ocr: Box<dyn OcrEngine>,
        classifier: DiseaseClassifier,
        extractor: Box<dyn MedicineExtractor>,
    ) -> Result<Self, StartupError> {
        Ok(Self {
            ocr,
            fields: FieldExtractor::new()?,
            classifier,
            extractor,
        })
    }

    /// Resolve the OCR engine, load model artifacts and pick the medicine
    /// extractor. A missing engine or model does not fail startup unless
    /// `ocr.require_engine` is set; the affected calls fail instead.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let resolution = resolve_engine(&config.ocr.engine);
        if !resolution.is_resolved() {
            if config.ocr.require_engine {
                return Err(StartupError::EngineRequired(resolution.diagnostic));
            }
            warn!("OCR calls will fail: {}", resolution.diagnostic);
        }
        let ocr = TesseractEngine::new(&resolution)
            .with_language(&config.ocr.language)
            .with_page_segmentation_mode(config.ocr.page_segmentation_mode);

        let classifier = DiseaseClassifier::load(&config.artifacts.paths());

        let extractor: Box<dyn MedicineExtractor> = match config.extraction.mode {
            ExtractionMode::Template => Box::new(match config.extraction.seed {
                Some(seed) => TemplateCatalogExtractor::with_seed(seed),
                None => TemplateCatalogExtractor::new(),
            }),
            ExtractionMode::Text => Box::new(PrescriptionTextExtractor::new()?),
        };

        info!(
            engine = resolution.is_resolved(),
            model = classifier.is_available(),
            extraction = ?config.extraction.mode,
            "Analysis service ready"
        );
        Self::new(Box::new(ocr), classifier, extractor)
    }

    pub fn classifier(&self) -> &DiseaseClassifier {
        &self.classifier
    }

    /// Fails with `ModelUnavailable` when the artifacts did not load, so no
    /// report is read while the classifier is down.
    fn ensure_model_ready(&self) -> AnalysisResult<()> {
        match self.classifier.unavailable_reason() {
            None => Ok(()),
            Some(reason) => Err(AnalysisError::ModelUnavailable(reason.to_string())),
        }
    }

    /// OCR an image and classify the report.
    pub fn analyze_clinical_report(&self, image: &[u8]) -> AnalysisResult<ClassificationResult> {
        self.ensure_model_ready()?;
        let text = self.ocr.recognize(image)?;
        self.analyze_report_text(&text)
    }

    pub fn analyze_report_file(&self, path: &Path) -> AnalysisResult<ClassificationResult> {
        self.ensure_model_ready()?;
        let text = self.ocr.recognize_file(path)?;
        self.analyze_report_text(&text)
    }

    /// Classify already recognized report text.
    pub fn analyze_report_text(&self, text: &str) -> AnalysisResult<ClassificationResult> {
        self.ensure_model_ready()?;
        let vector = self.extract_biomarkers(text);
        if vector.is_all_zero() {
            warn!("No readable data found matching expected metrics");
            return Err(AnalysisError::UnreadableDocument);
        }
        self.classifier.classify(&vector)
    }

    pub fn extract_biomarkers(&self, text: &str) -> BiomarkerVector {
        self.fields.extract(text)
    }

    /// Run `analyze_clinical_report` on a worker thread and give up after
    /// `deadline`. Nothing is cancelled on timeout: the worker thread and any
    /// OCR child process it started keep running until they finish on their
    /// own, and their result is dropped.
    pub fn analyze_with_deadline(
        self: &Arc<Self>,
        image: Vec<u8>,
        deadline: Duration,
    ) -> AnalysisResult<ClassificationResult> {
        self.ensure_model_ready()?;
        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(self);

        thread::spawn(move || {
            let _ = tx.send(service.analyze_clinical_report(&image));
        });

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!("Analysis exceeded deadline of {:?}", deadline);
                Err(AnalysisError::Timeout(deadline))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AnalysisError::Prediction(
                "analysis worker stopped without a result".into(),
            )),
        }
    }

    pub fn extract_medicines(&self, document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry> {
        self.extractor.extract(document)
    }

    pub fn match_inventory(
        &self,
        entries: &[ExtractedMedicineEntry],
        snapshot: &InventorySnapshot,
        seller: Option<SellerId>,
    ) -> MatchResult {
        match_inventory(entries, snapshot, seller)
    }

    /// One-shot extraction and matching for a pending upload.
    pub fn process_upload(
        &self,
        upload: &mut PrescriptionUpload,
        document: &PrescriptionDocument,
        snapshot: &InventorySnapshot,
    ) -> Result<UploadStatus, UploadError> {
        let status = upload.process(self.extractor.as_ref(), document, snapshot)?;
        info!(upload_id = %upload.upload_id, status = status.as_str(), "Upload processed");
        Ok(status)
    }
}
