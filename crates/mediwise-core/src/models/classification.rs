//! Classification output models.

use serde::{Deserialize, Serialize};

/// Raw classifier output before recommendations are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    /// Predicted disease label
    pub disease_label: String,
    /// Maximum class probability as a percentage, two-decimal precision
    pub confidence_percent: f64,
}

/// Decision-ready result for one clinical report. Not persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub disease_label: String,
    /// In [0, 100], rounded to two decimals
    pub confidence_percent: f64,
    pub diet_advice: String,
    pub workout_advice: String,
    pub precautions: String,
    /// Fingerprint of the model artifacts that produced this result
    pub artifact_version: String,
}

impl ClassificationResult {
    /// Confidence formatted to exactly two decimal places, e.g. "87.50".
    pub fn confidence_display(&self) -> String {
        format_confidence(self.confidence_percent)
    }
}

/// Scale a probability to a percentage clamped to [0, 100], kept at the
/// two-decimal value `format_confidence` shows for it. Rounding happens on
/// the exact binary value, so a half-cent tie like 57.125 becomes 57.12.
pub fn probability_to_percent(probability: f64) -> f64 {
    let percent = (probability * 100.0).clamp(0.0, 100.0);
    format_confidence(percent).parse().unwrap_or(percent)
}

pub fn format_confidence(percent: f64) -> String {
    format!("{:.2}", percent)
}
