//! Diet, workout, and precaution guidance per disease label.

use std::io::Read;

use serde::{Deserialize, Serialize};

/// One row of the recommendation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRow {
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "Diet_Recommendation")]
    pub diet: String,
    #[serde(rename = "Workout_Recommendation")]
    pub workout: String,
    #[serde(rename = "Precautions")]
    pub precautions: String,
}

/// Recommendation table, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationTable {
    rows: Vec<RecommendationRow>,
}

impl RecommendationTable {
    pub fn new(rows: Vec<RecommendationRow>) -> Self {
        Self { rows }
    }

    /// Parse CSV with a header row `Disease,Diet_Recommendation,Workout_Recommendation,Precautions`.
    pub fn from_reader<R: Read>(reader: R) -> csv::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = rdr.deserialize().collect::<csv::Result<Vec<RecommendationRow>>>()?;
        Ok(Self { rows })
    }

    /// First row whose label matches exactly.
    pub fn resolve(&self, label: &str) -> Option<&RecommendationRow> {
        self.rows.iter().find(|r| r.disease == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.disease.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
