//! # Write Gate
//!
//! Serializes catalog writers inside this process.
//!
//! ```text
//! task A ── lock ──► BEGIN ── validate ── insert ── COMMIT ── unlock
//! task B ── lock (waits for A) ─────────────────────────────► BEGIN ...
//! quote  ── pool read, never touches the gate
//! ```
//!
//! SQLite allows one writer at a time anyway; taking the lock before
//! `BEGIN` means a workflow never validates against a snapshot that
//! another writer is about to change.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

use waybill_db::{CatalogTransaction, Database, DbResult};

#[derive(Debug, Clone, Default)]
pub struct WriteGate {
    lock: Arc<Mutex<()>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the gate, then opens a catalog transaction.
    pub async fn open<'g>(&'g self, db: &Database) -> DbResult<WriteScope<'g>> {
        let guard = self.lock.lock().await;
        trace!("Write gate acquired");
        let tx = db.begin().await?;
        Ok(WriteScope { tx, guard })
    }
}

/// A held gate plus its transaction.
///
/// Dropping the scope rolls the transaction back before the gate opens.
pub struct WriteScope<'g> {
    pub tx: CatalogTransaction,
    guard: MutexGuard<'g, ()>,
}

impl WriteScope<'_> {
    pub async fn commit(self) -> DbResult<()> {
        let WriteScope { tx, guard } = self;
        tx.commit().await?;
        drop(guard);
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        let WriteScope { tx, guard } = self;
        tx.rollback().await?;
        drop(guard);
        Ok(())
    }
}
