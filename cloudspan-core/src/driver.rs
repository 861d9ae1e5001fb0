use crate::{Connection, Prepared, SqlWriter, Transaction};

/// Entry point of a backend: names the concrete types it plugs into the data layer.
pub trait Driver: Send + Sync + Sized {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;
    type Prepared: Prepared;
    type Transaction<'c>: Transaction<'c, Driver = Self>;

    /// Scheme of the connection urls accepted by this driver.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
