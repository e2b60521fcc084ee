//! Error types for credence.
//!
//! Only hard failures live here. Expected negative outcomes (wrong password,
//! taken nickname, ...) are not errors; they are returned as
//! [`Outcome::Denied`](crate::Outcome) values so callers must branch on them.

use thiserror::Error;

use crate::store::StoreError;

/// Common error type for credence operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No password was supplied and `autopass` is disabled.
    #[error("no password provided")]
    NoPassword,

    /// No password repeat was supplied and `must_repeat` is enabled.
    #[error("no password repeat provided")]
    NoPasswordRepeat,

    /// An identity was required but no usable hint was supplied.
    #[error("no identity hint provided")]
    MissingIdentity,

    /// The store collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The hashing engine failed (e.g. the worker task was cancelled).
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for credence operations.
pub type Result<T> = std::result::Result<T, Error>;
