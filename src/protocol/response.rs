use bincode::{Decode, Encode};
use thiserror::Error;

/// First value of every response envelope. `Success` is followed by the
/// operation's result value, `Failure` by a [`DatabaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum Outcome {
    Success,
    Failure,
}

/// Machine-distinguishable failure kinds the store reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Error)]
pub enum DatabaseErrorKind {
    /// A lookup matched nothing, including credential validation misses.
    #[error("not found")]
    NotFound,
    /// A mutation collided with an existing key or link.
    #[error("duplicate")]
    Duplicate,
    /// Transaction bracket misuse: nested begin, or end without begin.
    #[error("transaction")]
    Transaction,
    /// An argument was outside its documented domain.
    #[error("invalid request")]
    Invalid,
}

/// Application error produced by the backing store and passed through the
/// failure side of a call envelope unchanged. Receiving one means the request
/// itself was delivered and answered; the connection stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Error)]
#[error("{kind}: {message}")]
pub struct DatabaseError {
    pub kind: DatabaseErrorKind,
    pub message: String,
}

impl DatabaseError {
    pub fn new(kind: DatabaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::NotFound, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::Duplicate, message)
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::Transaction, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::Invalid, message)
    }
}
