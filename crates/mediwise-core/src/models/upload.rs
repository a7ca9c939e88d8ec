//! Uploaded prescription record. Persisted by the caller, transitioned by the core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    ExtractedMedicineEntry, InventorySnapshot, MatchResult, MatchedEntry, PrescriptionDocument,
    SellerId, UnmatchedEntry, UploadStatus,
};
use crate::extraction::MedicineExtractor;
use crate::inventory::match_inventory;

#[derive(Error, Debug, PartialEq)]
pub enum UploadError {
    #[error("Upload {upload_id} was already processed (status: {status})")]
    AlreadyProcessed { upload_id: String, status: String },
}

/// A prescription upload and the outcome of its one-shot processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionUpload {
    pub upload_id: String,
    /// Seller the upload was addressed to; `None` means all sellers
    pub seller_id: Option<SellerId>,
    pub notes: Option<String>,
    pub status: UploadStatus,
    pub extracted: Vec<ExtractedMedicineEntry>,
    pub matched: Vec<MatchedEntry>,
    pub unmatched: Vec<UnmatchedEntry>,
    pub created_at: String,
    pub processed_at: Option<String>,
}

impl PrescriptionUpload {
    /// Create a pending upload.
    pub fn new(seller_id: Option<SellerId>, notes: Option<String>) -> Self {
        Self {
            upload_id: uuid::Uuid::new_v4().to_string(),
            seller_id,
            notes,
            status: UploadStatus::Pending,
            extracted: Vec::new(),
            matched: Vec::new(),
            unmatched: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            processed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == UploadStatus::Pending
    }

    /// Extract medicines from the document and match them against the
    /// snapshot, scoped to this upload's seller. Runs once; a processed
    /// upload is left untouched.
    pub fn process(
        &mut self,
        extractor: &dyn MedicineExtractor,
        document: &PrescriptionDocument,
        snapshot: &InventorySnapshot,
    ) -> Result<UploadStatus, UploadError> {
        if !self.is_pending() {
            return Err(self.already_processed());
        }

        let extracted = extractor.extract(document);
        let result = match_inventory(&extracted, snapshot, self.seller_id);
        self.complete(extracted, result)
    }

    /// Record extraction and match results. Allowed exactly once, from `Pending`.
    pub fn complete(
        &mut self,
        extracted: Vec<ExtractedMedicineEntry>,
        result: MatchResult,
    ) -> Result<UploadStatus, UploadError> {
        if !self.is_pending() {
            return Err(self.already_processed());
        }

        let status = result.upload_status();
        self.extracted = extracted;
        self.matched = result.matched;
        self.unmatched = result.unmatched;
        self.status = status;
        self.processed_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(status)
    }

    fn already_processed(&self) -> UploadError {
        UploadError::AlreadyProcessed {
            upload_id: self.upload_id.clone(),
            status: self.status.as_str().to_string(),
        }
    }
}
