//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Classification and report code take plain records and never execute SQL.

mod report;
mod tracts;

use crate::error::ClassifyResult;
use rusqlite::Connection;

pub struct TractStore {
    conn: Connection,
}

impl TractStore {
    pub fn open(path: &str) -> ClassifyResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ClassifyResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ClassifyResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_tracts.sql"))?;
        Ok(())
    }
}
