use crate::{
    PrimaryKeyStrategy, SpannerConnection, SpannerPrepared, SpannerSqlWriter, SpannerTransaction,
};
use cloudspan_core::Driver;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpannerDriver {
    primary_key_strategy: PrimaryKeyStrategy,
}

impl SpannerDriver {
    pub const fn new(primary_key_strategy: PrimaryKeyStrategy) -> Self {
        Self {
            primary_key_strategy,
        }
    }
    pub fn primary_key_strategy(&self) -> PrimaryKeyStrategy {
        self.primary_key_strategy
    }
}

impl Driver for SpannerDriver {
    type Connection = SpannerConnection;
    type SqlWriter = SpannerSqlWriter;
    type Prepared = SpannerPrepared;
    type Transaction<'c> = SpannerTransaction<'c>;

    const NAME: &'static str = "spanner";

    fn sql_writer(&self) -> SpannerSqlWriter {
        SpannerSqlWriter::new(self.primary_key_strategy)
    }
}
