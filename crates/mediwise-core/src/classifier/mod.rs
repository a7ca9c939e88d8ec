//! Disease classifier over the CBC biomarker vector.
//!
//! Three artifacts are loaded once and versioned together:
//! - tree-ensemble model (JSON)
//! - label index (JSON, class index → disease label)
//! - recommendation table (CSV)
//!
//! If any of them is missing or inconsistent the classifier is permanently
//! unavailable: every call fails with `MODEL_UNAVAILABLE` and nothing is
//! reloaded.

mod forest;
mod recommendations;

pub use forest::*;
pub use recommendations::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    probability_to_percent, BiomarkerVector, ClassificationResult, Prediction, BIOMARKER_SCHEMA,
};

pub const DEFAULT_MODEL_FILE: &str = "medical_model.json";
pub const DEFAULT_LABELS_FILE: &str = "label_encoder.json";
pub const DEFAULT_RECOMMENDATIONS_FILE: &str = "cbc_disease_recommendations.csv";

/// Artifact loading errors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Artifact not found at {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON artifact error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Recommendation table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Inconsistent artifacts: {0}")]
    Invalid(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Locations of the three model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub labels: PathBuf,
    pub recommendations: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside one directory.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(DEFAULT_MODEL_FILE),
            labels: dir.join(DEFAULT_LABELS_FILE),
            recommendations: dir.join(DEFAULT_RECOMMENDATIONS_FILE),
        }
    }
}

/// Class index → disease label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelIndex {
    pub classes: Vec<String>,
}

impl LabelIndex {
    pub fn label(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

struct LoadedModel {
    model: ForestModel,
    labels: LabelIndex,
    recommendations: RecommendationTable,
    version: String,
}

enum ClassifierState {
    Ready(LoadedModel),
    Unavailable(String),
}

/// Immutable, load-once disease classifier. Safe to share across threads.
pub struct DiseaseClassifier {
    state: ClassifierState,
}

impl DiseaseClassifier {
    /// Load artifacts; on any failure the classifier is permanently unavailable.
    pub fn load(paths: &ArtifactPaths) -> Self {
        match Self::try_load(paths) {
            Ok(classifier) => classifier,
            Err(e) => {
                error!("Critical error loading ML assets: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Load artifacts, reporting the first failure.
    pub fn try_load(paths: &ArtifactPaths) -> ClassifierResult<Self> {
        let model_bytes = read_artifact(&paths.model)?;
        let label_bytes = read_artifact(&paths.labels)?;
        let rec_bytes = read_artifact(&paths.recommendations)?;

        let model: ForestModel = serde_json::from_slice(&model_bytes)?;
        let labels: LabelIndex = serde_json::from_slice(&label_bytes)?;
        let recommendations = RecommendationTable::from_reader(rec_bytes.as_slice())?;
        let version = fingerprint(&[&model_bytes, &label_bytes, &rec_bytes]);

        Self::assemble(model, labels, recommendations, version)
    }

    /// Build from in-memory artifacts (tests, embedded models).
    pub fn from_parts(
        model: ForestModel,
        labels: LabelIndex,
        recommendations: RecommendationTable,
    ) -> ClassifierResult<Self> {
        let model_bytes = serde_json::to_vec(&model)?;
        let label_bytes = serde_json::to_vec(&labels)?;
        let rec_labels: Vec<&str> = recommendations.labels().collect();
        let rec_bytes = serde_json::to_vec(&rec_labels)?;
        let version = fingerprint(&[&model_bytes, &label_bytes, &rec_bytes]);

        Self::assemble(model, labels, recommendations, version)
    }

    /// A classifier that rejects every call.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ClassifierState::Unavailable(reason.into()),
        }
    }

    fn assemble(
        model: ForestModel,
        labels: LabelIndex,
        recommendations: RecommendationTable,
        version: String,
    ) -> ClassifierResult<Self> {
        model
            .validate(&BIOMARKER_SCHEMA)
            .map_err(ClassifierError::Invalid)?;

        if labels.classes.len() != model.n_classes {
            return Err(ClassifierError::Invalid(format!(
                "label index has {} classes, model has {}",
                labels.classes.len(),
                model.n_classes
            )));
        }

        for label in &labels.classes {
            if recommendations.resolve(label).is_none() {
                warn!(label = %label, "label has no recommendation row");
            }
        }

        info!(
            version = %version,
            trees = model.trees.len(),
            classes = model.n_classes,
            "ML assets loaded successfully"
        );

        Ok(Self {
            state: ClassifierState::Ready(LoadedModel {
                model,
                labels,
                recommendations,
                version,
            }),
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ClassifierState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ClassifierState::Ready(_) => None,
            ClassifierState::Unavailable(reason) => Some(reason),
        }
    }

    /// SHA-256 fingerprint of the loaded artifacts.
    pub fn artifact_version(&self) -> Option<&str> {
        match &self.state {
            ClassifierState::Ready(loaded) => Some(&loaded.version),
            ClassifierState::Unavailable(_) => None,
        }
    }

    fn loaded(&self) -> AnalysisResult<&LoadedModel> {
        match &self.state {
            ClassifierState::Ready(loaded) => Ok(loaded),
            ClassifierState::Unavailable(reason) => {
                Err(AnalysisError::ModelUnavailable(reason.clone()))
            }
        }
    }

    /// Predict the disease label and confidence for a biomarker vector.
    pub fn predict(&self, vector: &BiomarkerVector) -> AnalysisResult<Prediction> {
        let loaded = self.loaded()?;
        let (class, probability) = loaded
            .model
            .predict(vector.as_slice())
            .map_err(AnalysisError::Prediction)?;

        let label = loaded.labels.label(class).ok_or_else(|| {
            AnalysisError::Prediction(format!("class index {} has no label", class))
        })?;

        Ok(Prediction {
            disease_label: label.to_string(),
            confidence_percent: probability_to_percent(probability),
        })
    }

    /// Recommendation row for a predicted label.
    pub fn recommend(&self, label: &str) -> AnalysisResult<&RecommendationRow> {
        self.loaded()?
            .recommendations
            .resolve(label)
            .ok_or_else(|| AnalysisError::NoRecommendation(label.to_string()))
    }

    /// Predict and attach recommendations.
    pub fn classify(&self, vector: &BiomarkerVector) -> AnalysisResult<ClassificationResult> {
        let prediction = self.predict(vector)?;
        info!(
            "Prediction: {} ({:.2}%)",
            prediction.disease_label, prediction.confidence_percent
        );

        let advice = self.recommend(&prediction.disease_label)?;
        let version = self.artifact_version().unwrap_or_default().to_string();

        Ok(ClassificationResult {
            disease_label: prediction.disease_label,
            confidence_percent: prediction.confidence_percent,
            diet_advice: advice.diet.clone(),
            workout_advice: advice.workout.clone(),
            precautions: advice.precautions.clone(),
            artifact_version: version,
        })
    }
}

fn read_artifact(path: &Path) -> ClassifierResult<Vec<u8>> {
    if !path.exists() {
        return Err(ClassifierError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ClassifierError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Length-prefixed SHA-256 over artifact contents, hex encoded.
fn fingerprint(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}
