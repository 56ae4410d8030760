//! Exchange balance database operations

use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqlResult, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::types::{Exchange, ExchangeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: ExchangeId,
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ExchangeRecord {
    pub fn new(id: ExchangeId, quote_balance: Decimal, base_balance: Decimal) -> Self {
        ExchangeRecord {
            id,
            quote_balance,
            base_balance,
            created_at: None,
            updated_at: None,
        }
    }

    /// Parse a row from the database
    fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(ExchangeRecord {
            id: row.get(0)?,
            quote_balance: decimal_column(row, 1)?,
            base_balance: decimal_column(row, 2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    /// Insert exchange into database
    pub fn insert(&self, conn: &Connection) -> SqlResult<usize> {
        conn.execute(
            "INSERT INTO exchanges (id, quote_balance, base_balance) VALUES (?1, ?2, ?3)",
            params![
                self.id,
                self.quote_balance.to_string(),
                self.base_balance.to_string(),
            ],
        )
    }

    /// Find exchange by ID
    pub fn find_by_id(conn: &Connection, id: ExchangeId) -> SqlResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, quote_balance, base_balance, created_at, updated_at
             FROM exchanges WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// List all exchanges
    pub fn list_all(conn: &Connection) -> SqlResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, quote_balance, base_balance, created_at, updated_at
             FROM exchanges ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| Self::from_row(row))?;
        rows.collect()
    }

    pub fn count(conn: &Connection) -> SqlResult<i64> {
        conn.query_row("SELECT COUNT(*) FROM exchanges", [], |row| row.get(0))
    }
}

impl From<&ExchangeRecord> for Exchange {
    fn from(record: &ExchangeRecord) -> Self {
        Exchange::new(record.id, record.quote_balance, record.base_balance)
    }
}

/// Balances are stored as TEXT so no precision is lost
fn decimal_column(row: &Row, index: usize) -> SqlResult<Decimal> {
    let text: String = row.get(index)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insert_and_find() {
        let db = Database::new_in_memory().unwrap();
        db.run_migrations().unwrap();
        let conn = db.lock().unwrap();

        ExchangeRecord::new(3, dec!(0.0000000000000000000000000001), dec!(10))
            .insert(&conn)
            .unwrap();

        let found = ExchangeRecord::find_by_id(&conn, 3).unwrap().unwrap();
        assert_eq!(found.quote_balance, dec!(0.0000000000000000000000000001));
        assert_eq!(found.base_balance, dec!(10));
        assert!(found.created_at.is_some());

        assert!(ExchangeRecord::find_by_id(&conn, 4).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let db = Database::new_in_memory().unwrap();
        db.run_migrations().unwrap();
        let conn = db.lock().unwrap();

        ExchangeRecord::new(1, dec!(1), dec!(1)).insert(&conn).unwrap();
        assert!(ExchangeRecord::new(1, dec!(2), dec!(2)).insert(&conn).is_err());
    }

    #[test]
    fn test_corrupt_balance_is_an_error() {
        let db = Database::new_in_memory().unwrap();
        db.run_migrations().unwrap();
        let conn = db.lock().unwrap();

        conn.execute(
            "INSERT INTO exchanges (id, quote_balance, base_balance) VALUES (1, 'lots', '1')",
            [],
        )
        .unwrap();

        assert!(ExchangeRecord::list_all(&conn).is_err());
    }
}
