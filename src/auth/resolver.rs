//! Identity resolution.
//!
//! Maps caller-supplied identity hints (email, nick, username, id) to a
//! unique stored user with one single-field exact-match query. Workflows
//! accept an [`Identity`], which is either raw hints or a user the caller
//! already holds; the latter skips the lookup entirely.

use crate::store::{User, UserField, UserStore};
use crate::{Error, Result};

/// Raw identity hints from a caller.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    /// Email address.
    pub email: Option<String>,
    /// Nickname.
    pub nick: Option<String>,
    /// Alias for nick, kept for callers that speak "username".
    pub username: Option<String>,
    /// Store-assigned user id.
    pub id: Option<String>,
}

impl Hints {
    /// Create empty hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the email hint.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the nick hint.
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// Set the username hint (resolved as a nick).
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the id hint.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Identity input for workflows: raw hints, or a user already in hand.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Resolve these hints against the user store.
    Hints(Hints),
    /// Use this user as-is, no lookup.
    Resolved(User),
}

impl From<Hints> for Identity {
    fn from(hints: Hints) -> Self {
        Identity::Hints(hints)
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity::Resolved(user)
    }
}

/// Resolve hints to a stored user.
///
/// Precedence when several hints are given: email outranks nick, except
/// that an identical email/nick pair without an `@` is treated as a nick
/// (the value is evidently not an email). A lone username counts as a
/// nick; an id is consulted last. With no usable hint at all this is a
/// hard [`Error::MissingIdentity`] failure.
///
/// Not finding a user is `Ok(None)`; whether that is a soft rejection or
/// an error is the calling workflow's decision.
pub async fn resolve(users: &dyn UserStore, hints: &Hints) -> Result<Option<User>> {
    let (field, value) = query_target(hints)?;
    let user = users.find_by(field, value).await?;
    Ok(user)
}

fn query_target(hints: &Hints) -> Result<(UserField, &str)> {
    let email = non_empty(&hints.email);
    let nick = non_empty(&hints.nick);

    if let (Some(email), Some(nick)) = (email, nick) {
        return if email == nick && !email.contains('@') {
            Ok((UserField::Nick, nick))
        } else {
            Ok((UserField::Email, email))
        };
    }
    if let Some(email) = email {
        return Ok((UserField::Email, email));
    }
    if let Some(nick) = nick {
        return Ok((UserField::Nick, nick));
    }
    if let Some(username) = non_empty(&hints.username) {
        return Ok((UserField::Nick, username));
    }
    if let Some(id) = non_empty(&hints.id) {
        return Ok((UserField::Id, id));
    }
    Err(Error::MissingIdentity)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
