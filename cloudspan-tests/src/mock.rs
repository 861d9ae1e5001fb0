use cloudspan::{DataError, Error, Result, future::BoxFuture};
use cloudspan_spanner::{
    BatchCreateSessionsRequest, BeginTransactionRequest, CommitRequest, CommitResponse,
    ExecuteSqlRequest, ResultSet, RollbackRequest, Session, SpannerTransport, TransactionId,
    UpdateDatabaseDdlRequest,
};
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};
use time::{OffsetDateTime, macros::datetime};

/// A request received by [`MockSpanner`].
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    BatchCreateSessions(BatchCreateSessionsRequest),
    BeginTransaction(BeginTransactionRequest),
    ExecuteSql(ExecuteSqlRequest),
    Commit(CommitRequest),
    Rollback(RollbackRequest),
    UpdateDatabaseDdl(UpdateDatabaseDdlRequest),
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::BatchCreateSessions(..) => "BatchCreateSessions",
            Request::BeginTransaction(..) => "BeginTransaction",
            Request::ExecuteSql(..) => "ExecuteSql",
            Request::Commit(..) => "Commit",
            Request::Rollback(..) => "Rollback",
            Request::UpdateDatabaseDdl(..) => "UpdateDatabaseDdl",
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Result(ResultSet),
    ConstraintViolation(String),
    Failure(String),
}

#[derive(Debug)]
struct MockState {
    requests: Vec<Request>,
    outcomes: HashMap<String, Outcome>,
    sessions: usize,
    transactions: u64,
    commit_timestamp: OffsetDateTime,
    commit_failure: Option<String>,
    rollback_failure: Option<String>,
    execute_delay: Option<Duration>,
    begin_delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

/// In memory stand in for the Spanner service.
///
/// Records every request and answers statements with the outcome registered for their exact
/// SQL text. Statements without a registered outcome return no rows, DML ones report one
/// affected row.
#[derive(Debug)]
pub struct MockSpanner {
    state: Mutex<MockState>,
}

impl Default for MockSpanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpanner {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                requests: Vec::new(),
                outcomes: HashMap::new(),
                sessions: 0,
                transactions: 0,
                commit_timestamp: datetime!(2025-03-14 09:26:53.589 UTC),
                commit_failure: None,
                rollback_failure: None,
                execute_delay: None,
                begin_delay: None,
                in_flight: 0,
                max_in_flight: 0,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_result(&self, sql: impl Into<String>, result: ResultSet) -> &Self {
        self.state()
            .outcomes
            .insert(sql.into(), Outcome::Result(result));
        self
    }

    pub fn add_update_count(&self, sql: impl Into<String>, count: i64) -> &Self {
        self.add_result(sql, ResultSet::update_count(count))
    }

    /// The statement fails as if the database detected a constraint violation.
    pub fn add_constraint_violation(&self, sql: impl Into<String>, message: impl Into<String>) -> &Self {
        self.state()
            .outcomes
            .insert(sql.into(), Outcome::ConstraintViolation(message.into()));
        self
    }

    /// The statement fails with an error of the transport itself.
    pub fn add_error(&self, sql: impl Into<String>, message: impl Into<String>) -> &Self {
        self.state()
            .outcomes
            .insert(sql.into(), Outcome::Failure(message.into()));
        self
    }

    pub fn set_commit_timestamp(&self, timestamp: OffsetDateTime) -> &Self {
        self.state().commit_timestamp = timestamp;
        self
    }

    pub fn set_commit_failure(&self, message: Option<&str>) -> &Self {
        self.state().commit_failure = message.map(Into::into);
        self
    }

    pub fn set_rollback_failure(&self, message: Option<&str>) -> &Self {
        self.state().rollback_failure = message.map(Into::into);
        self
    }

    /// Every statement waits this long before answering.
    pub fn set_execute_delay(&self, delay: Option<Duration>) -> &Self {
        self.state().execute_delay = delay;
        self
    }

    /// Every `BeginTransaction` waits this long before answering.
    pub fn set_begin_delay(&self, delay: Option<Duration>) -> &Self {
        self.state().begin_delay = delay;
        self
    }

    /// Highest number of statements that were executing at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.state().max_in_flight
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    pub fn request_kinds(&self) -> Vec<&'static str> {
        self.state().requests.iter().map(Request::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.kind() == kind)
            .count()
    }

    pub fn execute_requests(&self) -> Vec<ExecuteSqlRequest> {
        self.state()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::ExecuteSql(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn ddl_requests(&self) -> Vec<UpdateDatabaseDdlRequest> {
        self.state()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::UpdateDatabaseDdl(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    fn record(&self, request: Request) {
        self.state().requests.push(request);
    }
}

fn is_dml(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(keyword.as_str(), "INSERT" | "UPDATE" | "DELETE")
}

impl SpannerTransport for MockSpanner {
    fn batch_create_sessions(
        &self,
        request: BatchCreateSessionsRequest,
    ) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let sessions: Vec<Session> = {
                let mut state = self.state();
                let first = state.sessions;
                state.sessions += request.session_count;
                (first..state.sessions)
                    .map(|i| Session {
                        name: format!("{}/sessions/s{}", request.database, i),
                    })
                    .collect()
            };
            self.record(Request::BatchCreateSessions(request));
            Ok::<_, Error>(sessions)
        })
    }

    fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> BoxFuture<'_, Result<TransactionId>> {
        Box::pin(async move {
            let delay = self.state().begin_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let id = {
                let mut state = self.state();
                state.transactions += 1;
                TransactionId(state.transactions.to_be_bytes().to_vec())
            };
            self.record(Request::BeginTransaction(request));
            Ok::<_, Error>(id)
        })
    }

    fn execute_sql(&self, request: ExecuteSqlRequest) -> BoxFuture<'_, Result<ResultSet>> {
        Box::pin(async move {
            let (outcome, delay) = {
                let mut state = self.state();
                state.in_flight += 1;
                state.max_in_flight = state.max_in_flight.max(state.in_flight);
                (state.outcomes.get(&request.sql).cloned(), state.execute_delay)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.state().in_flight -= 1;
            let dml = is_dml(&request.sql);
            self.record(Request::ExecuteSql(request));
            let result: Result<ResultSet> = match outcome {
                Some(Outcome::Result(result)) => Ok(result),
                Some(Outcome::ConstraintViolation(message)) => {
                    Err(DataError::ConstraintViolation(message).into())
                }
                Some(Outcome::Failure(message)) => Err(Error::msg(message)),
                None if dml => Ok(ResultSet::update_count(1)),
                None => Ok(ResultSet::default()),
            };
            result
        })
    }

    fn commit(&self, request: CommitRequest) -> BoxFuture<'_, Result<CommitResponse>> {
        Box::pin(async move {
            let (failure, timestamp) = {
                let state = self.state();
                (state.commit_failure.clone(), state.commit_timestamp)
            };
            self.record(Request::Commit(request));
            let result: Result<CommitResponse> = match failure {
                Some(message) => Err(Error::msg(message)),
                None => Ok(CommitResponse {
                    commit_timestamp: Some(timestamp),
                }),
            };
            result
        })
    }

    fn rollback(&self, request: RollbackRequest) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let failure = self.state().rollback_failure.clone();
            self.record(Request::Rollback(request));
            let result: Result<()> = match failure {
                Some(message) => Err(Error::msg(message)),
                None => Ok(()),
            };
            result
        })
    }

    fn update_database_ddl(
        &self,
        request: UpdateDatabaseDdlRequest,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.record(Request::UpdateDatabaseDdl(request));
            Ok::<_, Error>(())
        })
    }
}
