//! Contains the error type returned by [`DataProvider`](crate::DataProvider) implementations.

use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by data providers. Implementations should choose the [`ErrorKind`] carefully
/// since the server uses it to decide how to answer the client.
#[derive(Debug, Error)]
#[error("data provider error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new data provider error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// A [`ErrorKind::NotFound`] error that carries the key that was looked up.
    pub fn not_found(key: impl std::fmt::Display) -> Error {
        Error::new(ErrorKind::NotFound, format!("no such user: {}", key))
    }

    /// The error returned by operations a provider refuses to perform. The reason should tell an
    /// operator where to make the change instead.
    pub fn unsupported(reason: impl Into<String>) -> Error {
        Error::new(ErrorKind::UnsupportedOperation, reason.into())
    }

    /// Tells the caller what category of failure occurred
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

/// The `ErrorKind` variants that can be produced by [`DataProvider`](crate::DataProvider)
/// implementations.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// An operation was attempted after the provider was closed. A second `close` also returns
    /// this.
    #[display("provider is closed")]
    ClosedProvider,
    /// The user does not exist, or the requested id is out of range.
    #[display("record not found")]
    NotFound,
    /// The password was empty or did not match.
    #[display("invalid credentials")]
    InvalidCredentials,
    /// The provider does not implement this operation, typically because another program owns
    /// the user store.
    #[display("unsupported operation")]
    UnsupportedOperation,
    /// The backing store could not be read or parsed.
    #[display("configuration unreadable")]
    ConfigUnreadable,
    /// A user record exists but lacks data needed to log in, e.g. a home directory.
    #[display("malformed user record")]
    MalformedRecord,
}

/// Result type used by [`DataProvider`](crate::DataProvider) operations.
pub type Result<T> = std::result::Result<T, Error>;
