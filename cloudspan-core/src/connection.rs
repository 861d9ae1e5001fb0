use crate::{Driver, Executor, Result};
use std::future::Future;

pub trait Connection: Executor {
    /// Connect to the database identified by `url`.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;

    /// Start a read-write transaction.
    fn begin(
        &mut self,
    ) -> impl Future<Output = Result<<Self::Driver as Driver>::Transaction<'_>>> + Send;
}
