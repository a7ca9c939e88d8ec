//! Prescription document and extracted medicine models.

use serde::{Deserialize, Serialize};

/// Course duration assumed when a prescription does not state one.
pub const DEFAULT_COURSE_DURATION: &str = "7 days";

/// A prescription-like source handed to a medicine extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionDocument {
    /// Recognized or typed prescription text
    pub text: String,
    /// Patient notes attached to the upload
    pub notes: Option<String>,
    /// Generic names the caller already knows from inventory
    pub catalogue_hints: Vec<String>,
}

impl PrescriptionDocument {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.catalogue_hints = hints;
        self
    }

    /// Text and notes, lowercased, for containment checks.
    pub fn searchable_text(&self) -> String {
        match &self.notes {
            Some(notes) => format!("{}\n{}", self.text, notes).to_lowercase(),
            None => self.text.to_lowercase(),
        }
    }
}

/// One medicine referenced by a document. All fields are raw strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMedicineEntry {
    pub name: String,
    /// e.g. "500mg"
    pub strength: Option<String>,
    /// e.g. "1 tablet 3 times daily"
    pub dosage_frequency: Option<String>,
    /// e.g. "7 days"
    pub duration_text: Option<String>,
    /// e.g. "21 tablets"
    pub quantity_text: Option<String>,
}

impl ExtractedMedicineEntry {
    /// Entry with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strength: None,
            dosage_frequency: None,
            duration_text: None,
            quantity_text: None,
        }
    }

    /// First integer in the quantity text, or 1.
    pub fn quantity_count(&self) -> u32 {
        self.quantity_text
            .as_deref()
            .and_then(first_integer)
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    /// Stated duration, or the default course.
    pub fn course_duration(&self) -> &str {
        self.duration_text
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_COURSE_DURATION)
    }
}

fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
