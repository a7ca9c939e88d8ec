//! Line-oriented prescription text parser.
//!
//! Reads lines of the form
//! `[Tab./Cap./Syp.] <Name> <strength> [dosage] [for N days] [, N tablets]`.
//! Lines without a recognizable strength are skipped.

use regex::Regex;
use tracing::debug;

use super::MedicineExtractor;
use crate::models::{ExtractedMedicineEntry, PrescriptionDocument};

const LINE_PATTERN: &str = r"(?i)^\s*(?:\d+[.)]\s*)?(?:(?:tab|tablet|cap|capsule|syp|syrup|inj)\.?\s+)?(?P<name>[a-z][a-z0-9\-]*(?:\s+[a-z][a-z0-9\-]*){0,2}?)\s+(?P<strength>\d+(?:\.\d+)?\s*(?:mg|mcg|g|ml|iu))\b(?P<rest>.*)$";
const DURATION_PATTERN: &str = r"(?i)\b(?:for\s+|x\s*)?(\d+\s*(?:days?|weeks?|months?))\b";
const QUANTITY_PATTERN: &str = r"(?i)^(?:(?:qty|quantity|total)\s*[:.\-]?\s*)?(\d+\s*(?:tablets?|tabs?|capsules?|caps?|bottles?|strips?|ml))$";

/// Parses medicine lines out of prescription text and notes.
pub struct PrescriptionTextExtractor {
    line: Regex,
    duration: Regex,
    quantity: Regex,
}

impl PrescriptionTextExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            line: Regex::new(LINE_PATTERN)?,
            duration: Regex::new(DURATION_PATTERN)?,
            quantity: Regex::new(QUANTITY_PATTERN)?,
        })
    }

    /// Parse one line, if it names a medicine with a strength.
    pub fn parse_line(&self, line: &str) -> Option<ExtractedMedicineEntry> {
        let caps = self.line.captures(line)?;
        let name = caps.name("name")?.as_str().trim().to_string();
        let strength: String = caps
            .name("strength")?
            .as_str()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let rest = caps.name("rest").map_or("", |m| m.as_str());

        let mut entry = ExtractedMedicineEntry::named(name);
        entry.strength = Some(strength);

        let mut dosage: Vec<String> = Vec::new();
        for segment in rest.split(|c| c == ',' || c == ';' || c == '|') {
            let segment = segment.trim().trim_start_matches('-').trim();
            if segment.is_empty() {
                continue;
            }

            if let Some(q) = self.quantity.captures(segment).and_then(|c| c.get(1)) {
                entry.quantity_text.get_or_insert_with(|| q.as_str().to_string());
                continue;
            }

            let mut remainder = segment.to_string();
            if let Some(d) = self.duration.captures(segment) {
                if let (Some(whole), Some(span)) = (d.get(0), d.get(1)) {
                    entry
                        .duration_text
                        .get_or_insert_with(|| span.as_str().to_string());
                    remainder = format!("{}{}", &segment[..whole.start()], &segment[whole.end()..]);
                }
            }

            let remainder = remainder.trim();
            if !remainder.is_empty() {
                dosage.push(remainder.to_string());
            }
        }

        if !dosage.is_empty() {
            entry.dosage_frequency = Some(dosage.join(", "));
        }
        Some(entry)
    }
}

impl MedicineExtractor for PrescriptionTextExtractor {
    fn extract(&self, document: &PrescriptionDocument) -> Vec<ExtractedMedicineEntry> {
        let lines = document
            .text
            .lines()
            .chain(document.notes.as_deref().unwrap_or("").lines());

        let mut entries: Vec<ExtractedMedicineEntry> = Vec::new();
        for line in lines {
            if let Some(entry) = self.parse_line(line) {
                if entries.iter().any(|e| e.name.eq_ignore_ascii_case(&entry.name)) {
                    continue;
                }
                debug!("Parsed medicine line: {}", entry.name);
                entries.push(entry);
            }
        }
        entries
    }
}
