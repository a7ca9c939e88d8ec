//! Blood-count biomarker vector.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of biomarkers the classifier was trained on.
pub const BIOMARKER_COUNT: usize = 15;

/// Trained field order. The classifier input must follow it exactly.
pub const BIOMARKER_SCHEMA: [&str; BIOMARKER_COUNT] = [
    "WBC",
    "RBC",
    "HGB",
    "HCT",
    "MCV",
    "MCH",
    "MCHC",
    "PLT",
    "NEUT%",
    "LYMPH%",
    "RDW",
    "RETIC%",
    "EOS%",
    "BASO%",
    "PLT_mean_volume",
];

#[derive(Error, Debug, PartialEq)]
pub enum BiomarkerError {
    #[error("expected {expected} biomarker values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("biomarker {name} has invalid value {value}")]
    InvalidValue { name: &'static str, value: f64 },
}

/// Values for the fixed biomarker schema, in schema order.
///
/// Missing measurements are 0.0. Every value is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerVector {
    values: [f64; BIOMARKER_COUNT],
}

impl Default for BiomarkerVector {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl BiomarkerVector {
    /// All biomarkers missing.
    pub fn zeroed() -> Self {
        Self {
            values: [0.0; BIOMARKER_COUNT],
        }
    }

    /// Build from values given in schema order.
    pub fn from_values(values: &[f64]) -> Result<Self, BiomarkerError> {
        if values.len() != BIOMARKER_COUNT {
            return Err(BiomarkerError::WrongLength {
                expected: BIOMARKER_COUNT,
                actual: values.len(),
            });
        }
        let mut vector = Self::zeroed();
        for (idx, &value) in values.iter().enumerate() {
            vector.set(idx, value)?;
        }
        Ok(vector)
    }

    /// Set the value at a schema index.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), BiomarkerError> {
        let name = BIOMARKER_SCHEMA.get(index).copied().ok_or(BiomarkerError::WrongLength {
            expected: BIOMARKER_COUNT,
            actual: index + 1,
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(BiomarkerError::InvalidValue { name, value });
        }
        self.values[index] = value;
        Ok(())
    }

    /// Look up a biomarker by schema name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<f64> {
        BIOMARKER_SCHEMA
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|idx| self.values[idx])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// (name, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        BIOMARKER_SCHEMA.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of biomarkers with a non-zero value.
    pub fn extracted_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    /// True when nothing was extracted. Such a vector must not reach the classifier.
    pub fn is_all_zero(&self) -> bool {
        self.extracted_count() == 0
    }
}
