//! credence - credential-management core
//!
//! Owns the lifecycle of a user's password, resolution of ambiguous
//! identity references, registration with uniqueness guarantees, login
//! issuance and password reset. Pure domain logic: persistence sits behind
//! the async store traits in [`store`], and nothing here opens a socket or
//! a file.
//!
//! Operations return `Result<Outcome<T>, Error>`. Hard failures (missing
//! password, store breakage) are the `Err` channel; expected business
//! rejections (wrong password, taken nickname) are [`Outcome::Denied`]
//! values carrying a stable string code.

pub mod auth;
pub mod config;
pub mod error;
pub mod outcome;
pub mod store;

pub use auth::{
    change_password, create_reset, derive, execute_reset, load_reset, login, redact, register,
    resolve, verify, Credential, Grant, Hints, Identity, LoginRequest, PasswordPolicy,
    RegisterRequest, ResetContext,
};
pub use config::{EntityFields, FieldSpec, Options};
pub use error::{Error, Result};
pub use outcome::{Denied, Outcome, Rejection};
pub use store::{
    Login, LoginReason, LoginStore, MemoryStore, Reset, ResetStore, StoreError, User, UserField,
    UserStore,
};
