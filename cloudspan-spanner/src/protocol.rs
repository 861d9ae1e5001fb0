//! Plain data model of the Spanner requests and responses exchanged with the transport.
use std::{fmt, time::Duration};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Bool,
    Int64,
    Float32,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
    Json,
    Array,
}

/// Type of a parameter or of a result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpannerType {
    pub code: TypeCode,
    /// Set only when `code` is [`TypeCode::Array`].
    pub array_element_type: Option<Box<SpannerType>>,
}

impl SpannerType {
    pub const fn scalar(code: TypeCode) -> Self {
        Self {
            code,
            array_element_type: None,
        }
    }
    pub fn array(element: SpannerType) -> Self {
        Self {
            code: TypeCode::Array,
            array_element_type: Some(Box::new(element)),
        }
    }
}

impl fmt::Display for SpannerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.array_element_type) {
            (TypeCode::Array, Some(element)) => write!(f, "ARRAY<{}>", element),
            (code, ..) => write!(f, "{}", format!("{:?}", code).to_uppercase()),
        }
    }
}

/// A value as carried by the protocol (`google.protobuf.Value` without structs).
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<WireValue>),
}

impl WireValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::String(value.into())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::String(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(pub Vec<u8>);

/// Timestamp bound of a read-only execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    #[default]
    Strong,
    ExactStaleness(Duration),
    MaxStaleness(Duration),
    ReadTimestamp(OffsetDateTime),
    MinReadTimestamp(OffsetDateTime),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RequestPriority {
    #[default]
    Unspecified,
    Low,
    Medium,
    High,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub priority: RequestPriority,
    pub request_tag: Option<String>,
    pub transaction_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOptions {
    ReadWrite,
    ReadOnly(Staleness),
}

/// Transaction a statement runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSelector {
    /// Temporary read-only transaction, ended by the server once the statement completes.
    SingleUse(Staleness),
    /// Previously begun transaction.
    Id(TransactionId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchCreateSessionsRequest {
    pub database: String,
    pub session_count: usize,
    pub database_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeginTransactionRequest {
    pub session: String,
    pub options: TransactionOptions,
    pub request_options: RequestOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteSqlRequest {
    pub session: String,
    pub transaction: TransactionSelector,
    pub sql: String,
    /// Named parameters, in binding order.
    pub params: Vec<(String, WireValue)>,
    pub param_types: Vec<(String, SpannerType)>,
    pub seqno: i64,
    pub request_options: RequestOptions,
}

impl ExecuteSqlRequest {
    pub fn param(&self, name: &str) -> Option<&WireValue> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
    pub fn param_type(&self, name: &str) -> Option<&SpannerType> {
        self.param_types
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub session: String,
    pub transaction_id: TransactionId,
    pub request_options: RequestOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollbackRequest {
    pub session: String,
    pub transaction_id: TransactionId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDatabaseDdlRequest {
    pub database: String,
    pub statements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: SpannerType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultSetStats {
    pub row_count_exact: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub metadata: Vec<Field>,
    pub rows: Vec<Vec<WireValue>>,
    /// Present for DML statements.
    pub stats: Option<ResultSetStats>,
}

impl ResultSet {
    /// Result of a DML statement without returned rows.
    pub fn update_count(count: i64) -> Self {
        Self {
            stats: Some(ResultSetStats {
                row_count_exact: count,
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResponse {
    pub commit_timestamp: Option<OffsetDateTime>,
}
