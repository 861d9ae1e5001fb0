pub mod codec;
mod config;
mod connection;
mod driver;
mod pool;
mod prepared;
mod protocol;
mod sql_writer;
mod transaction;
mod transport;
mod unit_of_work;
mod util;

pub use codec::{PENDING_COMMIT_TIMESTAMP, PendingCommitTimestamp};
pub use config::*;
pub use connection::*;
pub use driver::*;
pub use pool::*;
pub use prepared::*;
pub use protocol::*;
pub use sql_writer::*;
pub use transaction::*;
pub use transport::*;
pub use unit_of_work::*;
