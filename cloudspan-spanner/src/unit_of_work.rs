use crate::{
    BeginTransactionRequest, CommitRequest, ExecuteSqlRequest, ExecutionOptions, PooledSession,
    ResultSet, RollbackRequest, SessionPool, SpannerTransport, SpannerType, TransactionId,
    TransactionOptions, TransactionSelector, WireValue,
};
use cloudspan_core::{DataError, Error, Result, leading_keyword, truncate_long};
use std::{fmt, sync::Arc};
use time::OffsetDateTime;
use tokio::runtime::Handle;

/// Position of a unit of work in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Idle,
    SessionAcquired,
    TransactionActive,
    Committed,
    RolledBack,
}

impl UnitOfWorkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

/// Statements run between acquiring a session and giving it back.
///
/// In read-write mode the first statement is preceded by a `BeginTransaction` and the unit ends
/// with exactly one commit or rollback. In read-only mode every statement runs in a single use
/// read-only transaction and no begin or commit is ever sent.
///
/// The session returns to the pool as soon as a terminal state is reached, whatever the
/// outcome. A unit dropped while its transaction is active is rolled back in the background.
pub struct UnitOfWork {
    pool: Arc<SessionPool>,
    transport: Arc<dyn SpannerTransport>,
    options: ExecutionOptions,
    state: UnitOfWorkState,
    session: Option<PooledSession>,
    transaction_id: Option<TransactionId>,
    seqno: i64,
    commit_timestamp: Option<OffsetDateTime>,
}

/// Statements that modify data and therefore need a read-write transaction.
fn is_dml(sql: &str) -> bool {
    matches!(
        leading_keyword(sql).as_str(),
        "INSERT" | "UPDATE" | "DELETE" | "MERGE"
    )
}

impl UnitOfWork {
    pub fn new(
        pool: Arc<SessionPool>,
        transport: Arc<dyn SpannerTransport>,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            pool,
            transport,
            options,
            state: UnitOfWorkState::Idle,
            session: None,
            transaction_id: None,
            seqno: 0,
            commit_timestamp: None,
        }
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn is_read_only(&self) -> bool {
        self.options.is_read_only()
    }

    /// Commit time reported by the database, available once committed.
    pub fn commit_timestamp(&self) -> Option<OffsetDateTime> {
        self.commit_timestamp
    }

    fn invalid_state(&self, action: &str) -> Error {
        let error = Error::new(DataError::invalid_state(format!(
            "Cannot {} a unit of work that is {:?}",
            action, self.state
        )));
        log::error!("{:#}", error);
        error
    }

    fn session_name(&self) -> String {
        self.session
            .as_ref()
            .map(|v| v.name().to_string())
            .unwrap_or_default()
    }

    /// Enters a terminal state, the session goes back to the pool.
    fn finish(&mut self, state: UnitOfWorkState) {
        self.state = state;
        self.transaction_id = None;
        self.session = None;
    }

    async fn ensure_session(&mut self) -> Result<()> {
        if self.state == UnitOfWorkState::Idle {
            match self.pool.acquire().await {
                Ok(session) => {
                    self.session = Some(session);
                    self.state = UnitOfWorkState::SessionAcquired;
                }
                Err(e) => {
                    // Fatal for the unit of work, no retry here.
                    self.finish(UnitOfWorkState::RolledBack);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn ensure_transaction(&mut self) -> Result<()> {
        if self.state != UnitOfWorkState::SessionAcquired || self.is_read_only() {
            return Ok(());
        }
        let request = BeginTransactionRequest {
            session: self.session_name(),
            options: TransactionOptions::ReadWrite,
            request_options: self.options.request_options(),
        };
        log::debug!("BeginTransaction on {}", request.session);
        match self.transport.begin_transaction(request).await {
            Ok(id) => {
                self.transaction_id = Some(id);
                self.state = UnitOfWorkState::TransactionActive;
                Ok(())
            }
            Err(e) => {
                self.finish(UnitOfWorkState::RolledBack);
                let e = DataError::from_transport(e).context("While beginning a transaction");
                log::error!("{:#}", e);
                Err(e)
            }
        }
    }

    /// Runs one statement, `params` and `param_types` are keyed by parameter name.
    ///
    /// A failure while the transaction is active rolls it back before being returned.
    pub async fn execute(
        &mut self,
        sql: String,
        params: Vec<(String, WireValue)>,
        param_types: Vec<(String, SpannerType)>,
    ) -> Result<ResultSet> {
        if self.state.is_terminal() {
            return Err(self.invalid_state("execute a statement on"));
        }
        if self.is_read_only() && is_dml(&sql) {
            let error = Error::new(DataError::invalid_state(format!(
                "Cannot run a modifying statement in a read-only unit of work:\n{}",
                truncate_long!(sql)
            )));
            log::error!("{:#}", error);
            return Err(error);
        }
        self.ensure_session().await?;
        self.ensure_transaction().await?;
        let transaction = match &self.transaction_id {
            Some(id) => TransactionSelector::Id(id.clone()),
            None => TransactionSelector::SingleUse(self.options.staleness),
        };
        self.seqno += 1;
        let request = ExecuteSqlRequest {
            session: self.session_name(),
            transaction,
            sql,
            params,
            param_types,
            seqno: self.seqno,
            request_options: self.options.request_options(),
        };
        log::debug!("ExecuteSql on {}:\n{}", request.session, truncate_long!(request.sql));
        match self.transport.execute_sql(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                let e = DataError::from_transport(e);
                if self.state == UnitOfWorkState::TransactionActive {
                    return Err(self.rollback_after(e).await);
                }
                log::error!("{:#}", e);
                Err(e)
            }
        }
    }

    /// Rolls back after a failed statement and returns the statement error.
    async fn rollback_after(&mut self, error: Error) -> Error {
        let error = match self.send_rollback().await {
            Ok(()) => error,
            Err(rollback) => error.context(format!("The rollback also failed: {:#}", rollback)),
        };
        self.finish(UnitOfWorkState::RolledBack);
        log::error!("{:#}", error);
        error
    }

    async fn send_rollback(&mut self) -> Result<()> {
        let Some(transaction_id) = self.transaction_id.clone() else {
            return Ok(());
        };
        let request = RollbackRequest {
            session: self.session_name(),
            transaction_id,
        };
        log::debug!("Rollback on {}", request.session);
        self.transport
            .rollback(request)
            .await
            .map_err(DataError::from_transport)
    }

    /// Ends the unit of work successfully.
    ///
    /// Read-only units and read-write units that never ran a statement end without any request.
    pub async fn commit(&mut self) -> Result<Option<OffsetDateTime>> {
        if self.state.is_terminal() {
            return Err(self.invalid_state("commit"));
        }
        let Some(transaction_id) = self.transaction_id.clone() else {
            self.finish(UnitOfWorkState::Committed);
            return Ok(None);
        };
        let request = CommitRequest {
            session: self.session_name(),
            transaction_id,
            request_options: self.options.request_options(),
        };
        log::debug!("Commit on {}", request.session);
        match self.transport.commit(request).await {
            Ok(response) => {
                self.commit_timestamp = response.commit_timestamp;
                self.finish(UnitOfWorkState::Committed);
                Ok(self.commit_timestamp)
            }
            Err(e) => {
                // A failed commit leaves nothing to roll back on the server.
                self.finish(UnitOfWorkState::RolledBack);
                let e = DataError::from_transport(e).context("While committing the transaction");
                log::error!("{:#}", e);
                Err(e)
            }
        }
    }

    /// Abandons the unit of work, rolling back the active transaction if any.
    pub async fn rollback(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(self.invalid_state("roll back"));
        }
        let result = self.send_rollback().await;
        self.finish(UnitOfWorkState::RolledBack);
        result.map_err(|e| {
            let e = e.context("While rolling back the transaction");
            log::error!("{:#}", e);
            e
        })
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("session", &self.session)
            .finish()
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state != UnitOfWorkState::TransactionActive {
            return;
        }
        let (Some(session), Some(transaction_id)) = (self.session.take(), self.transaction_id.take())
        else {
            return;
        };
        self.state = UnitOfWorkState::RolledBack;
        log::warn!(
            "Unit of work on {} dropped while active, rolling it back",
            session.name()
        );
        let Ok(handle) = Handle::try_current() else {
            // No runtime to send the rollback, the session is released right away.
            return;
        };
        let transport = self.transport.clone();
        handle.spawn(async move {
            let request = RollbackRequest {
                session: session.name().to_string(),
                transaction_id,
            };
            if let Err(e) = transport.rollback(request).await {
                log::error!("{:#}", e.context("While rolling back a dropped unit of work"));
            }
            drop(session);
        });
    }
}
