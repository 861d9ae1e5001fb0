use crate::Error;
use std::{error::Error as StdError, fmt, time::Duration};

/// Failures that callers are expected to tell apart.
///
/// A `DataError` travels inside [`crate::Error`] (an `anyhow::Error`), so it keeps whatever
/// context was attached on the way up. Use [`DataError::kind_of`] to classify an error
/// without caring about the context layers.
#[derive(Debug)]
pub enum DataError {
    /// A value does not fit the declared type, or a wire value does not match its type code.
    TypeMismatch(String),
    /// Detected by the database, for example an explicit value for a server generated key.
    ConstraintViolation(String),
    /// The unit of work state machine was driven through an invalid transition.
    InvalidState(String),
    /// No session became available within the configured wait.
    PoolExhausted { size: usize, waited: Duration },
    /// Opaque failure of the transport collaborator.
    TransportFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    TypeMismatch,
    ConstraintViolation,
    InvalidState,
    PoolExhausted,
    TransportFailure,
}

impl DataError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        DataError::TypeMismatch(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        DataError::InvalidState(message.into())
    }

    pub fn kind(&self) -> DataErrorKind {
        match self {
            DataError::TypeMismatch(..) => DataErrorKind::TypeMismatch,
            DataError::ConstraintViolation(..) => DataErrorKind::ConstraintViolation,
            DataError::InvalidState(..) => DataErrorKind::InvalidState,
            DataError::PoolExhausted { .. } => DataErrorKind::PoolExhausted,
            DataError::TransportFailure(..) => DataErrorKind::TransportFailure,
        }
    }

    /// Finds the first `DataError` in the chain of `error`.
    pub fn kind_of(error: &Error) -> Option<DataErrorKind> {
        error
            .chain()
            .find_map(|e| e.downcast_ref::<DataError>())
            .map(DataError::kind)
    }

    /// Wraps a transport error, unless it already carries a `DataError` raised by the other side.
    pub fn from_transport(error: Error) -> Error {
        if DataError::kind_of(&error).is_some() {
            error
        } else {
            DataError::TransportFailure(error).into()
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::TypeMismatch(msg) => write!(f, "Type mismatch: {msg}"),
            DataError::ConstraintViolation(msg) => write!(f, "Constraint violation: {msg}"),
            DataError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            DataError::PoolExhausted { size, waited } => write!(
                f,
                "Pool exhausted: none of the {size} sessions became available within {}ms",
                waited.as_millis()
            ),
            DataError::TransportFailure(e) => write!(f, "Transport failure: {e:#}"),
        }
    }
}

impl StdError for DataError {}
