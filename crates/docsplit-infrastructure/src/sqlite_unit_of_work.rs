//! SQLite unit of work.
//!
//! One unit of work owns one sqlx transaction. The transaction sits behind an
//! async mutex shared with the unit's [`SqliteSplitRepository`]; `commit` and
//! `rollback` take it out, after which the repository reports the unit as
//! closed. Dropping a unit that still holds its transaction rolls it back.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use docsplit_core::split::SplitRepository;
use docsplit_core::uow::{UnitOfWork, UnitOfWorkFactory};
use docsplit_core::{DomainError, Result};

use crate::config::DatabaseConfig;
use crate::database;
use crate::sqlite_split_repository::{SqliteSplitRepository, storage_error};

/// An open transaction, or `None` once the unit has been finished.
pub(crate) type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Sqlite>>>>;

/// A unit of work over one SQLite transaction.
pub struct SqliteUnitOfWork {
    tx: SharedTransaction,
    splits: SqliteSplitRepository,
}

impl SqliteUnitOfWork {
    /// Starts a transaction on `pool`.
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(storage_error("failed to begin transaction"))?;
        let tx: SharedTransaction = Arc::new(Mutex::new(Some(tx)));
        Ok(Self {
            splits: SqliteSplitRepository::new(Arc::clone(&tx)),
            tx,
        })
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    fn split_repository(&self) -> &dyn SplitRepository {
        &self.splits
    }

    async fn commit(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::internal("transaction already closed"))?;
        tx.commit()
            .await
            .map_err(storage_error("failed to commit transaction"))?;
        debug!("[SqliteUnitOfWork] Committed");
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let Some(tx) = self.tx.lock().await.take() else {
            return Ok(());
        };
        tx.rollback()
            .await
            .map_err(storage_error("failed to roll back transaction"))?;
        debug!("[SqliteUnitOfWork] Rolled back");
        Ok(())
    }
}

/// Opens [`SqliteUnitOfWork`]s on a shared connection pool.
#[derive(Clone)]
pub struct SqliteUnitOfWorkFactory {
    pool: SqlitePool,
}

impl SqliteUnitOfWorkFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and prepares its schema.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = database::connect(config).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWorkFactory for SqliteUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let uow = SqliteUnitOfWork::begin(&self.pool).await?;
        Ok(Box::new(uow))
    }
}
