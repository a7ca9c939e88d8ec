//! Inventory matching.
//!
//! Entries are matched against a point-in-time snapshot of seller stock by
//! case-insensitive containment on generic and brand names. The snapshot is
//! never modified.

mod matcher;

pub use matcher::*;

use tracing::{debug, info};

use crate::models::{
    ExtractedMedicineEntry, InventoryRecord, InventorySnapshot, MatchResult, MatchedEntry,
    SellerId, UnavailableReason, UnmatchedEntry,
};

/// Matches medicine names against one snapshot, optionally scoped to a seller.
pub struct InventoryMatcher<'a> {
    snapshot: &'a InventorySnapshot,
    seller: Option<SellerId>,
}

impl<'a> InventoryMatcher<'a> {
    pub fn new(snapshot: &'a InventorySnapshot, seller: Option<SellerId>) -> Self {
        Self { snapshot, seller }
    }

    /// Qualifying row with the most stock; the first one wins on ties.
    pub fn best_match(&self, name: &str) -> Option<&'a InventoryRecord> {
        let name = normalize_name(name);
        if name.is_empty() {
            return None;
        }

        let mut best: Option<&'a InventoryRecord> = None;
        for record in self.snapshot.scoped(self.seller) {
            if !qualifies(&name, record) {
                continue;
            }
            match best {
                Some(current) if record.stock_quantity <= current.stock_quantity => {}
                _ => best = Some(record),
            }
        }
        best
    }

    /// Closest inventory name by similarity, if close enough.
    pub fn suggest(&self, name: &str) -> Option<String> {
        let name = normalize_name(name);
        if name.is_empty() {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for record in self.snapshot.scoped(self.seller) {
            for candidate in [record.generic_name.trim(), record.brand_name.trim()] {
                if candidate.is_empty() {
                    continue;
                }
                let score = similarity(&name, &candidate.to_lowercase());
                if score >= SUGGESTION_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                    best = Some((candidate, score));
                }
            }
        }
        best.map(|(candidate, _)| candidate.to_string())
    }

    /// Partition entries into matched and unmatched.
    pub fn match_entries(&self, entries: &[ExtractedMedicineEntry]) -> MatchResult {
        let mut result = MatchResult::default();

        for entry in entries {
            if normalize_name(&entry.name).is_empty() {
                result.unmatched.push(UnmatchedEntry {
                    entry: entry.clone(),
                    reason: UnavailableReason::BlankName,
                    suggestion: None,
                });
                continue;
            }

            match self.best_match(&entry.name) {
                Some(record) if record.in_stock() => {
                    debug!(
                        "Matched {} -> {} (stock {})",
                        entry.name, record.generic_name, record.stock_quantity
                    );
                    result.matched.push(MatchedEntry {
                        entry: entry.clone(),
                        record: record.clone(),
                    });
                }
                Some(record) => {
                    debug!("{} matched {} but it is out of stock", entry.name, record.generic_name);
                    result.unmatched.push(UnmatchedEntry {
                        entry: entry.clone(),
                        reason: UnavailableReason::OutOfStock,
                        suggestion: None,
                    });
                }
                None => {
                    let suggestion = self.suggest(&entry.name);
                    debug!("No inventory match for {} (suggestion: {:?})", entry.name, suggestion);
                    result.unmatched.push(UnmatchedEntry {
                        entry: entry.clone(),
                        reason: UnavailableReason::NoMatch,
                        suggestion,
                    });
                }
            }
        }

        info!(
            matched = result.matched.len(),
            unmatched = result.unmatched.len(),
            seller = ?self.seller,
            "Inventory match finished"
        );
        result
    }

    /// Match raw names.
    pub fn match_names(&self, names: &[&str]) -> MatchResult {
        let entries: Vec<ExtractedMedicineEntry> =
            names.iter().map(|n| ExtractedMedicineEntry::named(*n)).collect();
        self.match_entries(&entries)
    }
}

/// Match entries against a snapshot, optionally scoped to one seller.
pub fn match_inventory(
    entries: &[ExtractedMedicineEntry],
    snapshot: &InventorySnapshot,
    seller: Option<SellerId>,
) -> MatchResult {
    InventoryMatcher::new(snapshot, seller).match_entries(entries)
}

fn qualifies(name: &str, record: &InventoryRecord) -> bool {
    names_match(name, &normalize_name(&record.generic_name))
        || names_match(name, &normalize_name(&record.brand_name))
}
