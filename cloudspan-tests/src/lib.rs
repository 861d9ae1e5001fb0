mod mock;
mod models;
mod venues;

pub use mock::*;
pub use models::*;
pub use venues::*;

use cloudspan_spanner::{SpannerConnection, SpannerConnectionBuilder};
use log::LevelFilter;
use std::{env, sync::Arc};

pub const TEST_URL: &str = "spanner:///projects/test-project/instances/test-instance/databases/test-db";
pub const TEST_DATABASE: &str = "projects/test-project/instances/test-instance/databases/test-db";

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Builder of a connection to `mock`, on the test database.
pub fn mock_connection(mock: &Arc<MockSpanner>) -> SpannerConnectionBuilder {
    SpannerConnection::builder(TEST_URL).transport(mock.clone())
}

/// A fresh mock with a connection of `pool_size` sessions.
pub fn setup(pool_size: usize) -> (Arc<MockSpanner>, SpannerConnection) {
    init_logs();
    let mock = Arc::new(MockSpanner::new());
    let connection = mock_connection(&mock)
        .pool_size(pool_size)
        .build()
        .expect("Could not build the connection");
    (mock, connection)
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
