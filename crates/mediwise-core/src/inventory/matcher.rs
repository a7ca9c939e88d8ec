//! Name comparison rules.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum similarity for an unmatched name to get a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Trim and case-fold.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Equal, or either contains the other. Both sides must already be normalized
/// and non-empty.
pub fn names_match(medicine: &str, inventory: &str) -> bool {
    if medicine.is_empty() || inventory.is_empty() {
        return false;
    }
    medicine == inventory || inventory.contains(medicine) || medicine.contains(inventory)
}

/// String similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edits
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}
