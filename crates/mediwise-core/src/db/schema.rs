//! SQLite schema for the inventory snapshot source.

/// Inventory table as maintained by the inventory-management service.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY,
    seller_id INTEGER NOT NULL,
    seller_name TEXT NOT NULL DEFAULT '',
    generic_name TEXT NOT NULL DEFAULT '',
    brand_name TEXT NOT NULL DEFAULT '',
    strength TEXT NOT NULL DEFAULT '',
    stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
    unit_price REAL NOT NULL DEFAULT 0 CHECK (unit_price >= 0),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_inventory_seller ON inventory(seller_id);
CREATE INDEX IF NOT EXISTS idx_inventory_generic ON inventory(generic_name COLLATE NOCASE);
"#;

/// Table the snapshot reads from.
pub const INVENTORY_TABLE: &str = "inventory";
