use crate::{BatchCreateSessionsRequest, Session, SpannerConfig, SpannerTransport};
use cloudspan_core::{DataError, Error, Result};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};
use tokio::{
    sync::{OnceCell, OwnedSemaphorePermit, Semaphore},
    time::timeout,
};

/// Bounded set of sessions shared by the units of work of a connection.
///
/// All the sessions are created with a single batch request the first time one is needed.
/// A semaphore holds one permit per idle session, so an acquisition waits (up to the
/// configured timeout) instead of oversubscribing.
pub struct SessionPool {
    transport: Arc<dyn SpannerTransport>,
    database: String,
    database_role: Option<String>,
    size: usize,
    acquire_timeout: Duration,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Session>>,
    created: OnceCell<usize>,
}

impl SessionPool {
    pub fn new(config: &SpannerConfig, transport: Arc<dyn SpannerTransport>) -> Self {
        Self {
            transport,
            database: config.database.to_string(),
            database_role: config.database_role.clone(),
            size: config.pool_size,
            acquire_timeout: config.acquire_timeout,
            permits: Arc::new(Semaphore::new(0)),
            idle: Mutex::new(Vec::with_capacity(config.pool_size)),
            created: OnceCell::new(),
        }
    }

    /// Requested number of sessions.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sessions currently free, zero before the first acquisition.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Sessions actually created by the database, `None` before the first acquisition.
    pub fn created(&self) -> Option<usize> {
        self.created.get().copied()
    }

    async fn create_sessions(&self) -> Result<usize> {
        let request = BatchCreateSessionsRequest {
            database: self.database.clone(),
            session_count: self.size,
            database_role: self.database_role.clone(),
        };
        log::debug!("BatchCreateSessions {} x{}", self.database, self.size);
        let sessions = self
            .transport
            .batch_create_sessions(request)
            .await
            .map_err(|e| {
                let e = DataError::from_transport(e)
                    .context(format!("While creating the sessions of {}", self.database));
                log::error!("{:#}", e);
                e
            })?;
        if sessions.is_empty() {
            let error = Error::msg(format!(
                "The database {} did not create any session",
                self.database
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        let count = sessions.len();
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(sessions);
        self.permits.add_permits(count);
        Ok(count)
    }

    /// Takes a session for the exclusive use of the caller, it returns to the pool on drop.
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledSession> {
        self.created
            .get_or_try_init(|| self.create_sessions())
            .await?;
        let started = Instant::now();
        let permit = match timeout(self.acquire_timeout, self.permits.clone().acquire_owned()).await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(..)) => {
                let error = Error::new(DataError::invalid_state("The session pool is closed"));
                log::error!("{:#}", error);
                return Err(error);
            }
            Err(..) => {
                let error = Error::new(DataError::PoolExhausted {
                    size: self.created().unwrap_or(self.size),
                    waited: started.elapsed(),
                });
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        let session = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let Some(session) = session else {
            let error = Error::new(DataError::invalid_state(
                "A session permit was granted but no idle session is left",
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        log::trace!("Acquired session {}", session.name);
        Ok(PooledSession {
            session: Some(session),
            pool: self.clone(),
            _permit: permit,
        })
    }

    fn release(&self, session: Session) {
        log::trace!("Released session {}", session.name);
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(session);
    }
}

impl fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPool")
            .field("database", &self.database)
            .field("size", &self.size)
            .field("available", &self.available())
            .finish()
    }
}

/// A session exclusively owned by one unit of work.
pub struct PooledSession {
    session: Option<Session>,
    pool: Arc<SessionPool>,
    _permit: OwnedSemaphorePermit,
}

impl PooledSession {
    pub fn name(&self) -> &str {
        self.session.as_ref().map(|v| v.name.as_str()).unwrap_or_default()
    }
}

impl fmt::Debug for PooledSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledSession").field(&self.name()).finish()
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        // Back to the idle list before the permit is released by the field drop.
        if let Some(session) = self.session.take() {
            self.pool.release(session);
        }
    }
}
