//! Unit of work ports.
//!
//! A unit of work groups every repository call of one use case into a single
//! transaction. Callers finish it with exactly one of
//! [`commit`](UnitOfWork::commit) or [`rollback`](UnitOfWork::rollback);
//! dropping an unfinished unit discards its changes.

use async_trait::async_trait;

use crate::error::Result;
use crate::split::SplitRepository;

/// A transactional scope over the split repository.
///
/// After `commit` or `rollback`, repository calls fail with an Internal
/// error. Calling `rollback` after a successful `commit` is a no-op.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// The split repository bound to this unit's transaction.
    fn split_repository(&self) -> &dyn SplitRepository;

    /// Makes every change performed through this unit durable.
    async fn commit(&self) -> Result<()>;

    /// Discards every change performed through this unit.
    async fn rollback(&self) -> Result<()>;
}

/// Opens new units of work.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}
