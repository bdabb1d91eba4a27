//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Persistence`] returned when the key-value adapter fails.
//! - [`Validation`] returned when caller-supplied data is rejected before any
//!   write happens.
//! - [`ExistingKey`] returned when an id or email is already present.
//! - [`UnsupportedDocument`] returned when a mutation meets a transaction
//!   document written with a newer layout.
//!
//! A stored document that cannot be parsed is *not* an error: the record store
//! treats it as an empty collection.
//!
//!  [`Persistence`]: EngineError::Persistence
//!  [`Validation`]: EngineError::Validation
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`UnsupportedDocument`]: EngineError::UnsupportedDocument
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("record store writer is no longer running")]
    StoreClosed,
    #[error("transaction document version {0} is newer than this build supports")]
    UnsupportedDocument(u32),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Persistence(a), Self::Persistence(b)) => {
                a.kind() == b.kind() && a.to_string() == b.to_string()
            }
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::Hashing(a), Self::Hashing(b)) => a == b,
            (Self::StoreClosed, Self::StoreClosed) => true,
            (Self::UnsupportedDocument(a), Self::UnsupportedDocument(b)) => a == b,
            _ => false,
        }
    }
}
