//! Explicit engine handles and the unit-of-work lifecycle.
//!
//! There is no process-global engine or session factory: callers own a
//! [`Db`] (async) or a [`BlockingDb`] (sync facade) and every operation runs
//! inside exactly one [`UnitOfWork`]. Suspension happens only around
//! execute/commit/rollback; validation and compilation are synchronous and
//! finish before the first engine call.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::{Error, Result};

/// Owned handle to the underlying engine.
pub struct Db {
    conn: DatabaseConnection,
}

impl Db {
    /// Connect to the engine.
    ///
    /// # Errors
    /// Returns the engine's connection error untouched.
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = sea_orm::Database::connect(url).await?;
        Ok(Self { conn })
    }

    #[must_use]
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Open a fresh unit of work for one operation.
    ///
    /// # Errors
    /// Returns the engine's transaction error untouched.
    pub async fn open_scoped(&self) -> Result<UnitOfWork> {
        let txn = self.conn.begin().await?;
        Ok(UnitOfWork { txn })
    }
}

/// One logical transaction scope, consumed by exactly one operation.
///
/// Dropping an unfinalized unit of work rolls the transaction back, so an
/// early return on a validation or compilation error still releases it.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    #[must_use]
    pub fn from_transaction(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub(crate) fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub(crate) async fn commit(self) -> Result<()> {
        self.txn.commit().await?;
        Ok(())
    }

    pub(crate) async fn rollback(self) -> Result<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}

/// Shared tail of every operation: commit on success, roll back on failure
/// and re-raise the original error unchanged. A rollback failure is logged
/// but never replaces the error that caused it.
pub(crate) async fn finalize<T>(uow: UnitOfWork, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed after operation error");
            }
            Err(err)
        }
    }
}

/// Blocking facade: owns a current-thread runtime plus a [`Db`] and acquires
/// a scoped unit of work per call.
pub struct BlockingDb {
    rt: tokio::runtime::Runtime,
    db: Db,
}

impl BlockingDb {
    /// Connect from a blocking context.
    ///
    /// # Errors
    /// Returns [`Error::ExecutionContext`] when called from inside an async
    /// runtime, [`Error::Runtime`] if the runtime cannot be built, or the
    /// engine's connection error.
    pub fn connect(url: &str) -> Result<Self> {
        ensure_blocking_context()?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let db = rt.block_on(Db::connect(url))?;
        Ok(Self { rt, db })
    }

    #[must_use]
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Drive one operation to completion on the owned runtime.
    pub(crate) fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        ensure_blocking_context()?;
        self.rt.block_on(fut)
    }
}

/// Blocking entry points must not run inside an async runtime: `block_on`
/// would stall the executor. Callers already on a runtime use the async
/// variants with an explicit unit of work.
fn ensure_blocking_context() -> Result<()> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::ExecutionContext(
            "blocking entry point invoked inside an async runtime; \
             use the async variant with an explicit unit of work",
        ));
    }
    Ok(())
}
