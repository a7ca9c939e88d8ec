//! Medicine extraction from prescription documents.
//!
//! Downstream matching only sees `ExtractedMedicineEntry` values, so the
//! extractor can be swapped without touching the inventory side.

mod template;
mod text;

pub use template::*;
pub use text::*;

use crate::models::{ExtractedMedicineEntry, PrescriptionDocument};

/// Turns a prescription document into medicine entries.
pub trait MedicineExtractor: Send + Sync {
    fn extract(&self, document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry>;
}

/// Returns the same entries for every document.
#[derive(Debug, Clone, Default)]
pub struct FixedExtractor {
    entries: Vec<ExtractedMedicineEntry>,
}

impl FixedExtractor {
    pub fn new(entries: Vec<ExtractedMedicineEntry>) -> Self {
        Self { entries }
    }
}

impl MedicineExtractor for FixedExtractor {
    fn extract(&self, _document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry> {
        self.entries.clone()
    }
}
