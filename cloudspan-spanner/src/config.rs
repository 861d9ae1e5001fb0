use crate::{RequestOptions, RequestPriority, SpannerDriver, Staleness};
use cloudspan_core::{Driver, Error, ErrorContext, Result};
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;
use urlencoding::decode;

pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// How the database generates the values of autoincrement primary keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyStrategy {
    /// `GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE)`
    #[default]
    Identity,
    /// `AUTO_INCREMENT`
    AutoIncrement,
}

/// `projects/{project}/instances/{instance}/databases/{database}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePath {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

impl FromStr for DatabasePath {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let parts = value.trim_matches('/').split('/').collect::<Vec<_>>();
        match parts.as_slice() {
            ["projects", project, "instances", instance, "databases", database]
                if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    instance: instance.to_string(),
                    database: database.to_string(),
                })
            }
            _ => Err(Error::msg(format!(
                "`{}` is not a database path of the form projects/{{project}}/instances/{{instance}}/databases/{{database}}",
                value
            ))),
        }
    }
}

/// Settings of a connection, frozen once the connection is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub database: DatabasePath,
    pub primary_key_strategy: PrimaryKeyStrategy,
    /// Number of sessions created for the pool.
    pub pool_size: usize,
    /// Longest wait for a free session.
    pub acquire_timeout: Duration,
    pub database_role: Option<String>,
}

impl SpannerConfig {
    pub fn new(database: DatabasePath) -> Self {
        Self {
            database,
            primary_key_strategy: Default::default(),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            database_role: None,
        }
    }

    /// Parses `spanner:///projects/p/instances/i/databases/d?pool_size=4&use_auto_increment=true`.
    ///
    /// Recognized parameters are `use_auto_increment`, `pool_size`, `acquire_timeout_ms` and
    /// `database_role`. The pool settings fall back to the `SPANNER_POOL_SIZE` and
    /// `SPANNER_ACQUIRE_TIMEOUT_MS` environment variables.
    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While parsing the connection url `{}`", url);
        let prefix = format!("{}://", SpannerDriver::NAME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Spanner connection url must start with `{}`",
                prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let url = Url::parse(url).with_context(context)?;
        let path = decode(url.path()).with_context(context)?;
        let database = path.parse::<DatabasePath>().with_context(context)?;
        let mut result = Self::new(database);
        let param = |key: &str, env_var: Option<&str>| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .or_else(|| env_var.and_then(|v| env::var(v).ok()))
        };
        if let Some(value) = param("use_auto_increment", None) {
            result.primary_key_strategy = if parse_bool(&value).with_context(context)? {
                PrimaryKeyStrategy::AutoIncrement
            } else {
                PrimaryKeyStrategy::Identity
            };
        }
        if let Some(value) = param("pool_size", Some("SPANNER_POOL_SIZE")) {
            result.pool_size = value
                .parse()
                .with_context(|| format!("Invalid pool size `{}`", value))
                .with_context(context)?;
        }
        if let Some(value) = param("acquire_timeout_ms", Some("SPANNER_ACQUIRE_TIMEOUT_MS")) {
            result.acquire_timeout = Duration::from_millis(
                value
                    .parse()
                    .with_context(|| format!("Invalid acquire timeout `{}`", value))
                    .with_context(context)?,
            );
        }
        result.database_role = param("database_role", None);
        result.validate().with_context(context)?;
        Ok(result)
    }

    /// Checks the settings that have no usable meaning, a pool without sessions in particular.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            let error = Error::msg(format!(
                "The pool size of {} must be at least 1",
                self.database
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    pub fn use_auto_increment(mut self, value: bool) -> Self {
        self.primary_key_strategy = if value {
            PrimaryKeyStrategy::AutoIncrement
        } else {
            PrimaryKeyStrategy::Identity
        };
        self
    }
    /// Zero is rejected when the connection is built.
    pub fn pool_size(mut self, value: usize) -> Self {
        self.pool_size = value;
        self
    }
    pub fn acquire_timeout(mut self, value: Duration) -> Self {
        self.acquire_timeout = value;
        self
    }
    pub fn database_role(mut self, value: impl Into<String>) -> Self {
        self.database_role = Some(value.into());
        self
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::msg(format!("`{}` is not a boolean", value))),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    ReadWrite,
    /// Statements run in single use read-only transactions, no begin or commit is issued.
    ReadOnly,
}

/// Options of one unit of work.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub mode: ExecutionMode,
    /// Only meaningful in read-only mode.
    pub staleness: Staleness,
    pub request_priority: RequestPriority,
    pub transaction_tag: Option<String>,
    pub request_tag: Option<String>,
}

impl ExecutionOptions {
    pub fn read_only() -> Self {
        Self {
            mode: ExecutionMode::ReadOnly,
            ..Default::default()
        }
    }
    pub fn read_write() -> Self {
        Self::default()
    }
    pub fn is_read_only(&self) -> bool {
        self.mode == ExecutionMode::ReadOnly
    }
    pub fn with_staleness(mut self, staleness: Staleness) -> Self {
        self.staleness = staleness;
        self
    }
    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.request_priority = priority;
        self
    }
    pub fn with_transaction_tag(mut self, tag: impl Into<String>) -> Self {
        self.transaction_tag = Some(tag.into());
        self
    }
    pub fn with_request_tag(mut self, tag: impl Into<String>) -> Self {
        self.request_tag = Some(tag.into());
        self
    }

    /// Transaction tags are not allowed on read-only executions.
    pub(crate) fn request_options(&self) -> RequestOptions {
        RequestOptions {
            priority: self.request_priority,
            request_tag: self.request_tag.clone(),
            transaction_tag: if self.is_read_only() {
                None
            } else {
                self.transaction_tag.clone()
            },
        }
    }
}
