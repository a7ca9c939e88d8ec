//! Inventory snapshot reads.

use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::{InventoryRecord, InventorySnapshot, SellerId};

const SELECT_COLUMNS: &str = r#"
    SELECT id, generic_name, brand_name, strength, stock_quantity, unit_price,
           seller_id, seller_name
    FROM inventory
"#;

impl Database {
    /// Read all rows, or one seller's rows, in id order.
    pub fn inventory_snapshot(&self, seller: Option<SellerId>) -> DbResult<InventorySnapshot> {
        let records = match seller {
            Some(seller_id) => {
                let sql = format!("{} WHERE seller_id = ?1 ORDER BY id", SELECT_COLUMNS);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![seller_id], row_to_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map([], row_to_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        tracing::debug!("Inventory snapshot: {} rows (seller {:?})", records.len(), seller);
        Ok(InventorySnapshot::new(records))
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        record_id: row.get(0)?,
        generic_name: row.get(1)?,
        brand_name: row.get(2)?,
        strength: row.get(3)?,
        stock_quantity: row.get(4)?,
        unit_price: row.get(5)?,
        seller_id: row.get(6)?,
        seller_name: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(db: &Database) {
        let rows: [(i64, i64, &str, &str, &str, i64, f64); 4] = [
            (3, 2, "Dolo", "Dolo 650", "650mg", 12, 2.0),
            (1, 1, "Paracetamol", "Crocin", "500mg", 40, 1.5),
            (2, 1, "Citrizen", "", "10mg", 0, 3.25),
            (4, 2, "Paracetamol", "Calpol", "500mg", 100, 1.75),
        ];
        for (id, seller, generic, brand, strength, stock, price) in rows {
            db.conn()
                .execute(
                    r#"INSERT INTO inventory
                       (id, seller_id, seller_name, generic_name, brand_name, strength, stock_quantity, unit_price)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                    params![id, seller, format!("Pharmacy {}", seller), generic, brand, strength, stock, price],
                )
                .unwrap();
        }
    }

    #[test]
    fn test_snapshot_in_id_order() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let snapshot = db.inventory_snapshot(None).unwrap();
        let ids: Vec<i64> = snapshot.records.iter().map(|r| r.record_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(snapshot.records[0].brand_name, "Crocin");
        assert_eq!(snapshot.records[1].stock_quantity, 0);
        assert!(!snapshot.taken_at.is_empty());
    }

    #[test]
    fn test_snapshot_for_seller() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let snapshot = db.inventory_snapshot(Some(2)).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.records.iter().all(|r| r.seller_id == 2));
        assert_eq!(snapshot.records[0].seller_name, "Pharmacy 2");
    }

    #[test]
    fn test_empty_inventory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.inventory_snapshot(None).unwrap().is_empty());
    }

    #[test]
    fn test_negative_stock_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        let result = db.conn().execute(
            "INSERT INTO inventory (seller_id, generic_name, stock_quantity) VALUES (1, 'Dolo', -1)",
            [],
        );
        assert!(result.is_err());
    }
}
