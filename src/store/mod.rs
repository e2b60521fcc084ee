//! Store contract for credence.
//!
//! Persistence is an external collaborator. This module defines the records
//! the core constructs and the async traits the collaborator implements.
//! The core never talks to a database itself; [`MemoryStore`] is the
//! reference backend and the one the tests run against.
//!
//! Uniqueness of user nick/email is ultimately the store's job (a unique
//! constraint or equivalent). The registration workflow's checks are
//! advisory; `create` must fail with [`StoreError::Conflict`] when a
//! concurrent caller wins the race.

mod login;
mod memory;
mod reset;
mod user;

use async_trait::async_trait;
use thiserror::Error;

pub use login::{Login, LoginReason};
pub use memory::MemoryStore;
pub use reset::Reset;
pub use user::User;

/// Store-side errors. Surfaced to callers as hard failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the record.
    #[error("uniqueness conflict on {0}")]
    Conflict(&'static str),

    /// The backend failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Queryable user fields. Lookups are single-field exact matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    /// The unique nickname.
    Nick,
    /// The unique email address.
    Email,
    /// The store-assigned record id.
    Id,
}

impl UserField {
    /// Field name as used in queries and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Nick => "nick",
            UserField::Email => "email",
            UserField::Id => "id",
        }
    }
}

/// User record persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user whose `field` equals `value`, if any.
    async fn find_by(
        &self,
        field: UserField,
        value: &str,
    ) -> std::result::Result<Option<User>, StoreError>;

    /// Persist a new user and return it with its assigned id.
    async fn create(&self, user: User) -> std::result::Result<User, StoreError>;

    /// Persist changes to an existing user.
    async fn save(&self, user: User) -> std::result::Result<User, StoreError>;
}

/// Login record persistence. Append-only from the core's point of view.
#[async_trait]
pub trait LoginStore: Send + Sync {
    /// Persist a new login record.
    async fn create(&self, login: Login) -> std::result::Result<Login, StoreError>;
}

/// Reset record persistence.
#[async_trait]
pub trait ResetStore: Send + Sync {
    /// Find a reset record by its token id.
    async fn find_by_id(&self, id: &str) -> std::result::Result<Option<Reset>, StoreError>;

    /// Persist a new reset record.
    async fn create(&self, reset: Reset) -> std::result::Result<Reset, StoreError>;

    /// Persist changes to an existing reset record.
    async fn save(&self, reset: Reset) -> std::result::Result<Reset, StoreError>;
}
