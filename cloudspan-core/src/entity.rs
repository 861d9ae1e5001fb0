use crate::{
    Context, Driver, Error, Executor, Query, Result, Row, RowLabeled, RowsAffected, SqlWriter,
    TableDef, Value,
    stream::{Stream, StreamExt, TryStreamExt},
};
use futures::{FutureExt, TryFutureExt};
use std::{future::Future, pin::pin};

/// A Rust type stored as the rows of one table.
///
/// Implementors describe the table once and convert between themselves and rows, the
/// provided methods build the statements through the driver's [`SqlWriter`].
pub trait Entity: Send + Sync {
    fn table() -> &'static TableDef;

    /// Values aligned with the columns of [`Entity::table`].
    fn row(&self) -> Row;

    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;

    /// Values of the primary key columns, in declaration order.
    fn primary_key(&self) -> Vec<(&'static str, Value)> {
        let table = Self::table();
        table
            .columns
            .iter()
            .zip(self.row())
            .filter(|(c, _)| c.primary_key)
            .map(|(c, v)| (c.name.as_str(), v))
            .collect()
    }

    fn insert_one<Exec: Executor>(
        executor: &mut Exec,
        entity: &Self,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Self: Sized,
    {
        Self::insert_many(executor, [entity])
    }

    fn insert_many<'a, Exec, It>(
        executor: &mut Exec,
        items: It,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Self: Sized + 'a,
        Exec: Executor,
        It: IntoIterator<Item = &'a Self>,
    {
        let rows = items.into_iter().map(Entity::row).collect::<Vec<_>>();
        let mut context = Context::new();
        let mut sql = String::with_capacity(128);
        executor
            .driver()
            .sql_writer()
            .write_insert(&mut context, &mut sql, Self::table(), &rows);
        async move {
            if rows.is_empty() {
                return Ok(RowsAffected::default());
            }
            let query = prepare_bound(executor, sql, context).await?;
            executor.execute(query).await
        }
    }

    fn find_pk<Exec: Executor>(
        executor: &mut Exec,
        primary_key: &[(&str, Value)],
    ) -> impl Future<Output = Result<Option<Self>>> + Send
    where
        Self: Sized,
    {
        Self::find_one(executor, primary_key)
    }

    fn find_one<Exec: Executor>(
        executor: &mut Exec,
        filter: &[(&str, Value)],
    ) -> impl Future<Output = Result<Option<Self>>> + Send
    where
        Self: Sized,
    {
        let stream = Self::find_many(executor, filter, Some(1));
        async move { pin!(stream).into_future().map(|(v, _)| v).await.transpose() }
    }

    /// Rows whose columns equal every value of `filter`.
    fn find_many<Exec: Executor>(
        executor: &mut Exec,
        filter: &[(&str, Value)],
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<Self>> + Send
    where
        Self: Sized,
    {
        let mut context = Context::new();
        let mut sql = String::with_capacity(128);
        executor.driver().sql_writer().write_select(
            &mut context,
            &mut sql,
            Self::table(),
            filter,
            limit,
        );
        async move {
            let query = prepare_bound(executor, sql, context).await?;
            Ok(executor.fetch(query).and_then(|row| async move { Self::from_row(row) }))
        }
        .try_flatten_stream()
    }

    fn delete_many<Exec: Executor>(
        executor: &mut Exec,
        filter: &[(&str, Value)],
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Self: Sized,
    {
        let mut context = Context::new();
        let mut sql = String::with_capacity(128);
        executor
            .driver()
            .sql_writer()
            .write_delete(&mut context, &mut sql, Self::table(), filter);
        async move {
            let query = prepare_bound(executor, sql, context).await?;
            executor.execute(query).await
        }
    }

    /// Deletes the row having the primary key of this entity, expecting exactly one match.
    fn delete<Exec: Executor>(&self, executor: &mut Exec) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized,
    {
        let primary_key = self.primary_key();
        async move {
            let result = Self::delete_many(executor, &primary_key).await?;
            if result.rows_affected == 1 {
                Ok(())
            } else {
                let error = Error::msg(format!(
                    "The query deleted {} rows instead of the expected 1",
                    result.rows_affected
                ));
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }
}

/// Prepares `sql` and binds the parameters collected while writing it.
pub async fn prepare_bound<Exec: Executor>(
    executor: &mut Exec,
    sql: String,
    context: Context,
) -> Result<Query<Exec::Driver>> {
    let mut query = executor.prepare(sql).await?;
    for parameter in context.parameters {
        query.bind_as(parameter.value, &parameter.declared)?;
    }
    Ok(query)
}
