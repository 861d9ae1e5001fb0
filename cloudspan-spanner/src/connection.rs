use crate::{
    ExecutionMode, ExecutionOptions, SessionPool, SpannerConfig, SpannerDriver, SpannerPrepared,
    SpannerTransaction, SpannerTransport, UnitOfWork, UpdateDatabaseDdlRequest,
    transport::installed_transport,
    util::{result_set_to_results, statement_parts},
};
use async_stream::try_stream;
use cloudspan_core::{
    Connection, DataError, Driver, Error, Executor, Query, QueryResult, Result, RowsAffected,
    SqlWriter, TableDef, leading_keyword,
    stream::{Stream, TryStreamExt},
};
use std::{fmt, sync::Arc, time::Duration};

/// Statement kinds that go through the schema update request instead of a session.
pub(crate) fn is_ddl(keyword: &str) -> bool {
    matches!(keyword, "CREATE" | "DROP" | "ALTER")
}

fn is_query(keyword: &str) -> bool {
    matches!(keyword, "SELECT" | "WITH")
}

/// Handle to one database.
///
/// Cloning is cheap, the clones share the session pool. Statements executed directly on the
/// connection run as their own unit of work: queries in read-only mode, everything else in a
/// read-write transaction committed right after the statement.
#[derive(Clone)]
pub struct SpannerConnection {
    driver: SpannerDriver,
    config: Arc<SpannerConfig>,
    transport: Arc<dyn SpannerTransport>,
    pool: Arc<SessionPool>,
    options: ExecutionOptions,
}

impl SpannerConnection {
    pub fn builder(url: impl Into<String>) -> SpannerConnectionBuilder {
        SpannerConnectionBuilder {
            url: url.into(),
            transport: None,
            use_auto_increment: None,
            pool_size: None,
            acquire_timeout: None,
            database_role: None,
            options: Default::default(),
        }
    }

    pub fn new(config: SpannerConfig, transport: Arc<dyn SpannerTransport>) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(SessionPool::new(&config, transport.clone()));
        Ok(Self {
            driver: SpannerDriver::new(config.primary_key_strategy),
            config: Arc::new(config),
            transport,
            pool,
            options: Default::default(),
        })
    }

    pub fn config(&self) -> &SpannerConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    pub fn execution_options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// A connection sharing the pool, running its statements with `options`.
    pub fn with_execution_options(&self, options: ExecutionOptions) -> Self {
        Self {
            options,
            ..self.clone()
        }
    }

    /// A unit of work on this connection's pool, driven by the caller.
    pub fn unit_of_work(&self, options: ExecutionOptions) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone(), self.transport.clone(), options)
    }

    /// Starts a transaction with explicit options, read-only ones included.
    pub async fn begin_with(&mut self, options: ExecutionOptions) -> Result<SpannerTransaction<'_>> {
        let unit = self.unit_of_work(options);
        Ok(SpannerTransaction::new(&self.driver, unit))
    }

    /// Sends `statements` in a single schema update request.
    pub async fn update_ddl(&self, statements: Vec<String>) -> Result<()> {
        let request = UpdateDatabaseDdlRequest {
            database: self.config.database.to_string(),
            statements,
        };
        log::debug!(
            "UpdateDatabaseDdl on {}:\n{}",
            request.database,
            request.statements.join(";\n")
        );
        self.transport
            .update_database_ddl(request)
            .await
            .map_err(|e| {
                let e = DataError::from_transport(e).context("While updating the database schema");
                log::error!("{:#}", e);
                e
            })
    }

    pub async fn has_table(&mut self, name: &str) -> Result<bool> {
        let mut sql = String::with_capacity(128);
        self.driver.sql_writer().write_has_table(&mut sql, name);
        let rows = self
            .fetch(Query::Raw(sql))
            .try_collect::<Vec<_>>()
            .await?;
        Ok(!rows.is_empty())
    }

    /// Creates the tables, and their indexes, with a single schema update request.
    ///
    /// When `check_first` is set the tables that already exist are skipped.
    pub async fn create_all(&mut self, tables: &[&TableDef], check_first: bool) -> Result<()> {
        let writer = self.driver.sql_writer();
        let mut statements = Vec::new();
        for table in tables {
            if check_first && self.has_table(&table.name).await? {
                log::debug!("Table {} already exists", table.name);
                continue;
            }
            statements.extend(writer.create_table_statements(table));
        }
        if statements.is_empty() {
            return Ok(());
        }
        self.update_ddl(statements).await
    }

    /// Drops the tables in reverse order, children before their parents.
    ///
    /// When `check_first` is set the tables that do not exist are skipped.
    pub async fn drop_all(&mut self, tables: &[&TableDef], check_first: bool) -> Result<()> {
        let writer = self.driver.sql_writer();
        let mut statements = Vec::new();
        for table in tables.iter().rev() {
            if check_first && !self.has_table(&table.name).await? {
                continue;
            }
            statements.extend(writer.drop_table_statements(table));
        }
        if statements.is_empty() {
            return Ok(());
        }
        self.update_ddl(statements).await
    }
}

impl fmt::Debug for SpannerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpannerConnection")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("options", &self.options)
            .finish()
    }
}

impl Executor for SpannerConnection {
    type Driver = SpannerDriver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    async fn prepare(&mut self, sql: String) -> Result<Query<Self::Driver>> {
        Ok(Query::Prepared(SpannerPrepared::new(sql)))
    }

    fn run(&mut self, query: Query<Self::Driver>) -> impl Stream<Item = Result<QueryResult>> + Send {
        let context = Arc::new(format!("While running the query:\n{}", query));
        try_stream! {
            let (sql, params, param_types) = statement_parts(query)?;
            let keyword = leading_keyword(&sql);
            if is_ddl(&keyword) {
                self.update_ddl(vec![sql]).await?;
                yield QueryResult::Affected(RowsAffected::default());
            } else {
                let mut options = self.options.clone();
                if is_query(&keyword) {
                    options.mode = ExecutionMode::ReadOnly;
                }
                let mut unit = self.unit_of_work(options);
                let result_set = unit.execute(sql, params, param_types).await?;
                unit.commit().await?;
                for result in result_set_to_results(result_set)? {
                    yield result;
                }
            }
        }
        .map_err(move |e: Error| {
            let e = e.context(context.clone());
            log::error!("{:#}", e);
            e
        })
    }
}

impl Connection for SpannerConnection {
    async fn connect(url: &str) -> Result<SpannerConnection> {
        SpannerConnection::builder(url).build()
    }

    fn begin(&mut self) -> impl Future<Output = Result<SpannerTransaction<'_>>> + Send {
        let options = ExecutionOptions {
            mode: ExecutionMode::ReadWrite,
            ..self.options.clone()
        };
        self.begin_with(options)
    }
}

/// Collects the settings of a connection before freezing them.
///
/// Values set here override the ones of the url.
pub struct SpannerConnectionBuilder {
    url: String,
    transport: Option<Arc<dyn SpannerTransport>>,
    use_auto_increment: Option<bool>,
    pool_size: Option<usize>,
    acquire_timeout: Option<Duration>,
    database_role: Option<String>,
    options: ExecutionOptions,
}

impl SpannerConnectionBuilder {
    pub fn transport(mut self, transport: Arc<dyn SpannerTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
    pub fn use_auto_increment(mut self, value: bool) -> Self {
        self.use_auto_increment = Some(value);
        self
    }
    pub fn pool_size(mut self, value: usize) -> Self {
        self.pool_size = Some(value);
        self
    }
    pub fn acquire_timeout(mut self, value: Duration) -> Self {
        self.acquire_timeout = Some(value);
        self
    }
    pub fn database_role(mut self, value: impl Into<String>) -> Self {
        self.database_role = Some(value.into());
        self
    }
    pub fn execution_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<SpannerConnection> {
        let mut config = SpannerConfig::from_url(&self.url)?;
        if let Some(value) = self.use_auto_increment {
            config = config.use_auto_increment(value);
        }
        if let Some(value) = self.pool_size {
            config = config.pool_size(value);
        }
        if let Some(value) = self.acquire_timeout {
            config = config.acquire_timeout(value);
        }
        if let Some(value) = self.database_role {
            config = config.database_role(value);
        }
        let Some(transport) = self.transport.or_else(installed_transport) else {
            let error = Error::msg(format!(
                "No transport available for `{}`, pass one to the builder or install a default one",
                self.url
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        log::debug!(
            "Connecting to {} with {:?}",
            config.database,
            config.primary_key_strategy
        );
        let mut connection = SpannerConnection::new(config, transport)?;
        connection.options = self.options;
        Ok(connection)
    }
}
