use crate::{
    BatchCreateSessionsRequest, BeginTransactionRequest, CommitRequest, CommitResponse,
    ExecuteSqlRequest, ResultSet, RollbackRequest, Session, TransactionId,
    UpdateDatabaseDdlRequest,
};
use cloudspan_core::{Error, Result, future::BoxFuture};
use std::sync::{Arc, OnceLock};

/// The remote procedures this adapter relies on.
///
/// Implementations talk to the database (or pretend to, in tests). Errors are returned as is,
/// the adapter classifies anything that is not already a [`cloudspan_core::DataError`] as a
/// transport failure. Retries, if any, are the implementation's business.
pub trait SpannerTransport: Send + Sync {
    fn batch_create_sessions(
        &self,
        request: BatchCreateSessionsRequest,
    ) -> BoxFuture<'_, Result<Vec<Session>>>;

    fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> BoxFuture<'_, Result<TransactionId>>;

    fn execute_sql(&self, request: ExecuteSqlRequest) -> BoxFuture<'_, Result<ResultSet>>;

    fn commit(&self, request: CommitRequest) -> BoxFuture<'_, Result<CommitResponse>>;

    fn rollback(&self, request: RollbackRequest) -> BoxFuture<'_, Result<()>>;

    fn update_database_ddl(&self, request: UpdateDatabaseDdlRequest)
    -> BoxFuture<'_, Result<()>>;
}

static DEFAULT_TRANSPORT: OnceLock<Arc<dyn SpannerTransport>> = OnceLock::new();

/// Sets the transport used by connections opened through [`cloudspan_core::Connection::connect`].
///
/// It can be installed only once per process.
pub fn install_transport(transport: Arc<dyn SpannerTransport>) -> Result<()> {
    DEFAULT_TRANSPORT.set(transport).map_err(|_| {
        let error = Error::msg("A default Spanner transport is already installed");
        log::error!("{:#}", error);
        error
    })
}

pub(crate) fn installed_transport() -> Option<Arc<dyn SpannerTransport>> {
    DEFAULT_TRANSPORT.get().cloned()
}
