//! Biomarker field extraction from recognized report text.
//!
//! For every schema name, a case-insensitive pattern finds the name (with
//! `_`-separated parts allowed to be split by anything on the same line) and
//! takes the first decimal number after it. Missing fields stay at 0.0; no
//! plausibility range is applied here.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::models::{BiomarkerVector, BIOMARKER_SCHEMA};

/// Compiled per-biomarker search patterns, in schema order.
pub struct FieldExtractor {
    patterns: Vec<Regex>,
}

impl FieldExtractor {
    /// Compile patterns for the fixed schema.
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = BIOMARKER_SCHEMA
            .iter()
            .map(|name| {
                RegexBuilder::new(&field_pattern(name))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Extract the biomarker vector from plain text.
    pub fn extract(&self, text: &str) -> BiomarkerVector {
        let mut vector = BiomarkerVector::zeroed();

        for (idx, (name, pattern)) in BIOMARKER_SCHEMA.iter().zip(&self.patterns).enumerate() {
            let value = pattern
                .captures(text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok());

            match value {
                Some(v) => {
                    // Parsed from `\d+\.?\d*`, so always finite and non-negative.
                    if vector.set(idx, v).is_ok() {
                        debug!("Extracted {}: {}", name, v);
                    }
                }
                None => debug!("Could not extract {}, defaulting to 0.0", name),
            }
        }

        vector
    }
}

/// Build the search pattern for one biomarker name.
pub fn field_pattern(name: &str) -> String {
    let term = name
        .split('_')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*?");
    format!(r"{}.*?(\d+\.?\d*)", term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new().unwrap()
    }

    #[test]
    fn test_field_pattern() {
        assert_eq!(field_pattern("WBC"), r"WBC.*?(\d+\.?\d*)");
        assert_eq!(field_pattern("NEUT%"), r"NEUT%.*?(\d+\.?\d*)");
        assert_eq!(
            field_pattern("PLT_mean_volume"),
            r"PLT.*?mean.*?volume.*?(\d+\.?\d*)"
        );
    }

    #[test]
    fn test_extract_full_report() {
        let text = "\
WBC: 7.2
RBC: 4.8
HGB: 13.9
HCT: 41
MCV: 88.1
MCH: 29.4
MCHC: 33.6
PLT: 250
NEUT%: 60.5
LYMPH%: 30
RDW: 13.2
RETIC%: 1.1
EOS%: 2.4
BASO%: 0.6
PLT_mean_volume: 9.8
";
        let v = extractor().extract(text);

        assert_eq!(v.get("WBC"), Some(7.2));
        assert_eq!(v.get("HCT"), Some(41.0));
        assert_eq!(v.get("MCH"), Some(29.4));
        assert_eq!(v.get("MCHC"), Some(33.6));
        assert_eq!(v.get("PLT"), Some(250.0));
        assert_eq!(v.get("BASO%"), Some(0.6));
        assert_eq!(v.get("PLT_mean_volume"), Some(9.8));
        assert_eq!(v.extracted_count(), 15);
    }

    #[test]
    fn test_case_insensitive_and_noisy_separators() {
        let text = "Hemoglobin (hgb) ..... 12.5 g/dL\nwbc count = 11";
        let v = extractor().extract(text);

        assert_eq!(v.get("HGB"), Some(12.5));
        assert_eq!(v.get("WBC"), Some(11.0));
    }

    #[test]
    fn test_separator_parts_may_be_split() {
        let v = extractor().extract("PLT Mean Platelet Volume 10.4 fL");
        assert_eq!(v.get("PLT_mean_volume"), Some(10.4));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let v = extractor().extract("RDW: 15.1");

        assert_eq!(v.get("RDW"), Some(15.1));
        assert_eq!(v.get("WBC"), Some(0.0));
        assert_eq!(v.extracted_count(), 1);
    }

    #[test]
    fn test_name_without_number_on_line() {
        // `.` does not cross lines, so the number on the next line is not taken
        let v = extractor().extract("WBC\n7.0");
        assert_eq!(v.get("WBC"), Some(0.0));
    }

    #[test]
    fn test_unrelated_text_is_all_zero() {
        let v = extractor().extract("Invoice #42\nThank you for shopping");
        assert!(v.is_all_zero());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn name_colon_number_in_any_case(
                idx in 0usize..BIOMARKER_SCHEMA.len(),
                value in 0.0f64..10_000.0,
                upper in any::<bool>(),
            ) {
                let name = BIOMARKER_SCHEMA[idx];
                let name = if upper { name.to_uppercase() } else { name.to_lowercase() };
                let number = format!("{:.2}", value);
                let text = format!("{}: {}", name, number);

                let v = extractor().extract(&text);
                let expected: f64 = number.parse().unwrap();
                prop_assert_eq!(v.as_slice()[idx], expected);
            }
        }
    }
}
