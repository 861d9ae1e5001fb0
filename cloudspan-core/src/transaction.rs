use crate::{Executor, Result};
use std::future::Future;

/// Unit of work ending with exactly one of `commit` or `rollback`.
///
/// Dropping a transaction without calling either of them rolls it back.
pub trait Transaction<'c>: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}
