//! Soft rejection results.
//!
//! Workflows return `Result<Outcome<T>, Error>`: the outer `Result` carries
//! hard failures, the inner [`Outcome`] distinguishes success from an
//! expected, recoverable rejection. A rejection carries a stable string code
//! that external callers can branch on.

use std::fmt;

use crate::store::User;

/// Why a workflow refused to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Password and repeat did not match.
    PasswordMismatch,
    /// The configured password policy refused the password.
    PasswordWeak(String),
    /// A user with this nick already exists.
    NickExists,
    /// A user with this email already exists.
    EmailExists,
    /// The account is not active.
    NotActive,
    /// The proposed password did not verify.
    InvalidPassword,
    /// No user matched the identity hints.
    UserNotFound,
    /// Registration needs at least one of nick, email or username.
    NickOrEmailMissing,
    /// No active reset record matched the token.
    ResetNotFound,
    /// The reset record is older than the configured reset period.
    ResetExpired,
}

impl Rejection {
    /// Stable string code for this rejection.
    ///
    /// These codes are part of the external contract and never change.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::PasswordMismatch => "password_mismatch",
            Rejection::PasswordWeak(_) => "password_weak",
            Rejection::NickExists => "nick-exists",
            Rejection::EmailExists => "email-exists",
            Rejection::NotActive => "not-active",
            Rejection::InvalidPassword => "invalid-password",
            Rejection::UserNotFound => "user-not-found",
            Rejection::NickOrEmailMissing => "nick_or_email_missing",
            Rejection::ResetNotFound => "reset-not-found",
            Rejection::ResetExpired => "reset-expired",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A rejection plus whatever context the workflow can attach.
#[derive(Debug, Clone)]
pub struct Denied {
    /// The rejection code.
    pub why: Rejection,
    /// The nick involved, when known (e.g. `nick-exists`).
    pub nick: Option<String>,
    /// The resolved user, when known (e.g. `not-active`).
    pub user: Option<User>,
}

impl Denied {
    /// Create a denial with no extra context.
    pub fn new(why: Rejection) -> Self {
        Self {
            why,
            nick: None,
            user: None,
        }
    }

    /// Attach the nick involved.
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// Attach the resolved user.
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

/// Result of a workflow call that completed without a hard failure.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The workflow succeeded.
    Ok(T),
    /// The workflow refused; see [`Denied::why`].
    Denied(Denied),
}

impl<T> Outcome<T> {
    /// Shorthand for a denial without context.
    pub fn denied(why: Rejection) -> Self {
        Outcome::Denied(Denied::new(why))
    }

    /// True if the workflow succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    /// The success value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            Outcome::Denied(_) => None,
        }
    }

    /// The rejection, if the workflow refused.
    pub fn why(&self) -> Option<&Rejection> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Denied(denied) => Some(&denied.why),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_codes() {
        assert_eq!(Rejection::PasswordMismatch.code(), "password_mismatch");
        assert_eq!(Rejection::NickExists.code(), "nick-exists");
        assert_eq!(Rejection::EmailExists.code(), "email-exists");
        assert_eq!(Rejection::NotActive.code(), "not-active");
        assert_eq!(Rejection::InvalidPassword.code(), "invalid-password");
        assert_eq!(Rejection::UserNotFound.code(), "user-not-found");
        assert_eq!(Rejection::NickOrEmailMissing.code(), "nick_or_email_missing");
        assert_eq!(Rejection::ResetNotFound.code(), "reset-not-found");
        assert_eq!(Rejection::ResetExpired.code(), "reset-expired");
    }

    #[test]
    fn test_rejection_display_matches_code() {
        assert_eq!(
            format!("{}", Rejection::InvalidPassword),
            "invalid-password"
        );
        assert_eq!(
            format!("{}", Rejection::PasswordWeak("too short".to_string())),
            "password_weak"
        );
    }

    #[test]
    fn test_outcome_ok() {
        let outcome = Outcome::Ok(7);
        assert!(outcome.is_ok());
        assert!(outcome.why().is_none());
        assert_eq!(outcome.ok(), Some(7));
    }

    #[test]
    fn test_outcome_denied() {
        let outcome: Outcome<()> = Outcome::denied(Rejection::UserNotFound);
        assert!(!outcome.is_ok());
        assert_eq!(outcome.why(), Some(&Rejection::UserNotFound));
        assert!(outcome.ok().is_none());
    }

    #[test]
    fn test_denied_context() {
        let denied = Denied::new(Rejection::NickExists).with_nick("alice");
        assert_eq!(denied.nick.as_deref(), Some("alice"));
        assert!(denied.user.is_none());
    }
}
