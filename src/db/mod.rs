//! Database module for the SQLite balance store

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::{MetaExchangeError, MetaExchangeResult};

pub mod exchange;
pub mod exchange_service;

pub use exchange::ExchangeRecord;
pub use exchange_service::ExchangeService;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Shared SQLite connection
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file, creating parent directories
    pub fn new<P: AsRef<Path>>(path: P) -> MetaExchangeResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| MetaExchangeError::Database(e.to_string()))?;
            }
        }
        let conn = Connection::open(path)?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> MetaExchangeResult<Self> {
        let conn = Connection::open_in_memory()?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply pending migrations from `migrations/`
    pub fn run_migrations(&self) -> MetaExchangeResult<()> {
        let mut conn = self.lock()?;
        let report = embedded::migrations::runner().run(&mut *conn)?;
        debug!("Applied {} migrations", report.applied_migrations().len());
        Ok(())
    }

    /// Lock the connection for a query or transaction
    pub fn lock(&self) -> MetaExchangeResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MetaExchangeError::Database("connection lock poisoned".to_string()))
    }

    /// Check database health
    pub fn health_check(&self) -> MetaExchangeResult<bool> {
        let conn = self.lock()?;
        let result: i32 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(result == 1)
    }
}
