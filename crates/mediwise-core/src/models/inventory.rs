//! Seller inventory and matching models.

use serde::{Deserialize, Serialize};

use super::ExtractedMedicineEntry;

/// Seller (pharmacy) identifier in the external inventory system.
pub type SellerId = i64;

/// One stocked medicine, read from the external inventory collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    /// Row id in the seller's catalogue (used by cart collaborators)
    pub record_id: i64,
    pub generic_name: String,
    pub brand_name: String,
    pub strength: String,
    pub stock_quantity: u32,
    pub unit_price: f64,
    pub seller_id: SellerId,
    pub seller_name: String,
}

impl InventoryRecord {
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Point-in-time, unlocked read of seller stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventorySnapshot {
    pub records: Vec<InventoryRecord>,
    /// RFC 3339 timestamp of the read
    pub taken_at: String,
}

impl InventorySnapshot {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        Self {
            records,
            taken_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Records in scope for an optional seller.
    pub fn scoped(&self, seller: Option<SellerId>) -> impl Iterator<Item = &InventoryRecord> {
        self.records
            .iter()
            .filter(move |r| seller.map_or(true, |s| r.seller_id == s))
    }

    /// Distinct non-empty generic names, in encounter order.
    pub fn generic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            let name = record.generic_name.trim();
            if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// An entry resolved to an in-stock inventory row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedEntry {
    pub entry: ExtractedMedicineEntry,
    pub record: InventoryRecord,
}

/// Why an entry is reported NOT_AVAILABLE.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No inventory row matches the name
    NoMatch,
    /// The best matching row has zero stock
    OutOfStock,
    /// The entry has no usable name
    BlankName,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::NoMatch => "no_match",
            UnavailableReason::OutOfStock => "out_of_stock",
            UnavailableReason::BlankName => "blank_name",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UnavailableReason::NoMatch => "Not found in inventory",
            UnavailableReason::OutOfStock => "Not available in stock",
            UnavailableReason::BlankName => "Medicine name missing",
        }
    }
}

/// An entry with no usable inventory match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmatchedEntry {
    pub entry: ExtractedMedicineEntry,
    pub reason: UnavailableReason,
    /// Closest inventory name by string similarity, if any is close enough
    pub suggestion: Option<String>,
}

/// Lifecycle status of an uploaded prescription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadStatus {
    /// Uploaded, extraction and matching not yet run
    Pending,
    /// Every entry matched
    Processed,
    /// Some entries matched
    PartiallyAvailable,
    /// No entry matched
    NotAvailable,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Processed => "processed",
            UploadStatus::PartiallyAvailable => "partially_available",
            UploadStatus::NotAvailable => "not_available",
        }
    }
}

/// Partition of entries into matched and unmatched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub matched: Vec<MatchedEntry>,
    pub unmatched: Vec<UnmatchedEntry>,
}

impl MatchResult {
    /// Status an upload moves to after this match.
    pub fn upload_status(&self) -> UploadStatus {
        if self.unmatched.is_empty() {
            UploadStatus::Processed
        } else if !self.matched.is_empty() {
            UploadStatus::PartiallyAvailable
        } else {
            UploadStatus::NotAvailable
        }
    }

    /// Sum of unit prices of matched rows times requested quantity.
    pub fn estimated_total(&self) -> f64 {
        self.matched
            .iter()
            .map(|m| m.record.unit_price * f64::from(m.entry.quantity_count()))
            .sum()
    }
}
