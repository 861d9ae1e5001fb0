use crate::{
    SpannerDriver, SpannerPrepared, UnitOfWork, UnitOfWorkState,
    connection::is_ddl,
    util::{result_set_to_results, statement_parts},
};
use async_stream::try_stream;
use cloudspan_core::{
    DataError, Error, Executor, Query, QueryResult, Result, Transaction, leading_keyword,
    stream::{Stream, TryStreamExt},
};
use std::sync::Arc;
use time::OffsetDateTime;

fn reject_ddl(sql: &str) -> Result<()> {
    if is_ddl(&leading_keyword(sql)) {
        return Err(DataError::invalid_state(
            "Schema statements cannot run inside a transaction",
        )
        .into());
    }
    Ok(())
}

/// Transaction started from a [`crate::SpannerConnection`].
///
/// Holds one unit of work: the session is acquired by the first statement and released on
/// commit, rollback or drop.
#[derive(Debug)]
pub struct SpannerTransaction<'c> {
    driver: &'c SpannerDriver,
    unit: UnitOfWork,
}

impl<'c> SpannerTransaction<'c> {
    pub(crate) fn new(driver: &'c SpannerDriver, unit: UnitOfWork) -> Self {
        Self { driver, unit }
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.unit
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.unit.state()
    }

    /// Commits and returns the commit time reported by the database.
    ///
    /// `None` for read-only transactions and for ones that never ran a statement.
    pub async fn commit_with_timestamp(mut self) -> Result<Option<OffsetDateTime>> {
        self.unit.commit().await
    }
}

impl<'c> Executor for SpannerTransaction<'c> {
    type Driver = SpannerDriver;

    fn driver(&self) -> &Self::Driver {
        self.driver
    }

    async fn prepare(&mut self, sql: String) -> Result<Query<Self::Driver>> {
        Ok(Query::Prepared(SpannerPrepared::new(sql)))
    }

    fn run(&mut self, query: Query<Self::Driver>) -> impl Stream<Item = Result<QueryResult>> + Send {
        let context = Arc::new(format!("While running the query:\n{}", query));
        try_stream! {
            let (sql, params, param_types) = statement_parts(query)?;
            reject_ddl(&sql)?;
            let result_set = self.unit.execute(sql, params, param_types).await?;
            for result in result_set_to_results(result_set)? {
                yield result;
            }
        }
        .map_err(move |e: Error| {
            let e = e.context(context.clone());
            log::error!("{:#}", e);
            e
        })
    }
}

impl<'c> Transaction<'c> for SpannerTransaction<'c> {
    async fn commit(mut self) -> Result<()> {
        self.unit.commit().await.map(|_| ())
    }

    async fn rollback(mut self) -> Result<()> {
        self.unit.rollback().await
    }
}
