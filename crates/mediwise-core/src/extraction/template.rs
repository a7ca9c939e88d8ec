//! Catalogue-template extractor.
//!
//! Not real document understanding: known generic names found in the
//! document are expanded to canned dosing templates, then one to three of
//! them are picked at random to resemble a typical prescription.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::MedicineExtractor;
use crate::models::{ExtractedMedicineEntry, PrescriptionDocument};

/// Canned dosing for one known generic medicine.
#[derive(Debug, Clone, PartialEq)]
pub struct DosingTemplate {
    /// Lowercase catalogue key
    pub key: &'static str,
    pub strength: &'static str,
    pub dosage_frequency: &'static str,
    pub duration: &'static str,
    pub quantity: &'static str,
}

impl DosingTemplate {
    fn entry(&self, name: &str) -> ExtractedMedicineEntry {
        ExtractedMedicineEntry {
            name: name.to_string(),
            strength: Some(self.strength.to_string()),
            dosage_frequency: Some(self.dosage_frequency.to_string()),
            duration_text: Some(self.duration.to_string()),
            quantity_text: Some(self.quantity.to_string()),
        }
    }
}

pub const DOSING_TEMPLATES: [DosingTemplate; 3] = [
    DosingTemplate {
        key: "paracetamol",
        strength: "500mg",
        dosage_frequency: "1 tablet 3 times daily",
        duration: "7 days",
        quantity: "21 tablets",
    },
    DosingTemplate {
        key: "citrizen",
        strength: "10mg",
        dosage_frequency: "1 tablet at bedtime",
        duration: "7 days",
        quantity: "7 tablets",
    },
    DosingTemplate {
        key: "dolo",
        strength: "500mg",
        dosage_frequency: "1 tablet 3 times daily",
        duration: "7 days",
        quantity: "21 tablets",
    },
];

const DEFAULT_TEMPLATE: usize = 0;
const DEFAULT_NAME: &str = "Paracetamol";
const MAX_ENTRIES: usize = 3;

/// Template extractor with an optional fixed seed.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalogExtractor {
    seed: Option<u64>,
}

impl TemplateCatalogExtractor {
    /// Fresh entropy on every call.
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Same document always yields the same selection.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Every template entry the document refers to, before random selection.
    pub fn candidates(&self, document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry> {
        let text = document.searchable_text();
        let mut found: Vec<ExtractedMedicineEntry> = Vec::new();

        for template in DOSING_TEMPLATES.iter() {
            let hint = document
                .catalogue_hints
                .iter()
                .map(|h| h.trim())
                .find(|h| h.to_lowercase().contains(template.key));

            let name = match hint {
                Some(hint) => hint.to_string(),
                None if text.contains(template.key) => capitalize(template.key),
                None => continue,
            };

            if !found.iter().any(|e| e.name.eq_ignore_ascii_case(&name)) {
                found.push(template.entry(&name));
            }
        }

        if found.is_empty() {
            debug!("No catalogue medicine found, using default entry");
            found.push(DOSING_TEMPLATES[DEFAULT_TEMPLATE].entry(DEFAULT_NAME));
        }
        found
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl MedicineExtractor for TemplateCatalogExtractor {
    fn extract(&self, document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry> {
        let candidates = self.candidates(document);
        let mut rng = self.rng();

        let wanted = rng.gen_range(1..=MAX_ENTRIES).min(candidates.len());
        let picked: Vec<ExtractedMedicineEntry> = candidates
            .choose_multiple(&mut rng, wanted)
            .cloned()
            .collect();

        debug!(
            candidates = candidates.len(),
            picked = picked.len(),
            "Template extraction finished"
        );
        picked
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
