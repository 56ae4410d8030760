//! Exchange service: balance snapshots backed by the database

use rust_decimal::Decimal;
use tracing::info;

use super::{Database, ExchangeRecord};
use crate::config::DatabaseConfig;
use crate::core::types::{ExchangeId, Exchanges};
use crate::error::{MetaExchangeError, MetaExchangeResult};
use crate::sources::ExchangeSource;

/// Initial balances for a fresh database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub exchange_count: u32,
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
}

impl From<&DatabaseConfig> for Seed {
    fn from(config: &DatabaseConfig) -> Self {
        Seed {
            exchange_count: config.seed_exchange_count,
            quote_balance: config.seed_quote_balance,
            base_balance: config.seed_base_balance,
        }
    }
}

/// Reads exchange balances for the planner.
///
/// Balances are only read here; plans are not written back.
pub struct ExchangeService {
    db: Database,
}

impl ExchangeService {
    pub fn new(db: Database) -> Self {
        ExchangeService { db }
    }

    /// Open the configured database, migrate it and seed it if empty
    pub fn open(config: &DatabaseConfig) -> MetaExchangeResult<Self> {
        let service = Self::new(Database::new(&config.path)?);
        service.init(Seed::from(config))?;
        Ok(service)
    }

    /// Run migrations, then seed when there are no exchanges yet.
    /// Returns the number of exchanges created.
    pub fn init(&self, seed: Seed) -> MetaExchangeResult<usize> {
        self.db.run_migrations()?;

        let mut conn = self.db.lock()?;
        if ExchangeRecord::count(&conn)? > 0 {
            return Ok(0);
        }

        let count = ExchangeId::try_from(seed.exchange_count).map_err(|_| {
            MetaExchangeError::InvalidParameter(
                "seed_exchange_count".to_string(),
                "too large".to_string(),
            )
        })?;

        let tx = conn.transaction()?;
        for id in 1..=count {
            ExchangeRecord::new(id, seed.quote_balance, seed.base_balance).insert(&tx)?;
        }
        tx.commit()?;

        info!(
            "🏦 Seeded {} exchanges with {} quote / {} base",
            count, seed.quote_balance, seed.base_balance
        );
        Ok(count as usize)
    }

    pub fn list(&self) -> MetaExchangeResult<Vec<ExchangeRecord>> {
        let conn = self.db.lock()?;
        Ok(ExchangeRecord::list_all(&conn)?)
    }

    pub fn find(&self, id: ExchangeId) -> MetaExchangeResult<Option<ExchangeRecord>> {
        let conn = self.db.lock()?;
        Ok(ExchangeRecord::find_by_id(&conn, id)?)
    }

    pub fn add(&self, record: &ExchangeRecord) -> MetaExchangeResult<()> {
        let conn = self.db.lock()?;
        record.insert(&conn)?;
        Ok(())
    }
}

impl ExchangeSource for ExchangeService {
    fn exchanges(&self) -> MetaExchangeResult<Exchanges> {
        Ok(self
            .list()?
            .iter()
            .map(|record| (record.id, record.into()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seed(count: u32) -> Seed {
        Seed {
            exchange_count: count,
            quote_balance: dec!(10000),
            base_balance: dec!(10),
        }
    }

    #[test]
    fn test_seeds_only_once() {
        let service = ExchangeService::new(Database::new_in_memory().unwrap());

        assert_eq!(service.init(seed(3)).unwrap(), 3);
        assert_eq!(service.init(seed(3)).unwrap(), 0);
        assert_eq!(service.list().unwrap().len(), 3);
    }

    #[test]
    fn test_snapshot_keys_match_ids() {
        let service = ExchangeService::new(Database::new_in_memory().unwrap());
        service.init(seed(2)).unwrap();

        let exchanges = service.exchanges().unwrap();
        assert_eq!(exchanges.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(exchanges[&2].quote_balance, dec!(10000));
        assert_eq!(exchanges[&2].base_balance, dec!(10));
    }
}
