//! User registration.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::password;
use crate::config::Options;
use crate::outcome::{Denied, Outcome, Rejection};
use crate::store::{User, UserField, UserStore};
use crate::Result;

/// Input fields with a meaning of their own; never copied onto the record
/// as extra attributes.
const RESERVED_FIELDS: &[&str] = &[
    "role",
    "cmd",
    "nick",
    "email",
    "name",
    "active",
    "username",
    "password",
    "rounds",
    "salt",
    "pass",
    "id",
    "confirmed",
    "confirmcode",
];

/// Registration request data.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    /// Desired nickname.
    pub nick: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Alias for nick.
    pub username: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Password plain text.
    pub password: Option<String>,
    /// Password repeat.
    pub repeat: Option<String>,
    /// Initial active state; defaults to true.
    pub active: Option<bool>,
    /// Initial confirmed state; only meaningful when confirmation is
    /// required.
    pub confirmed: Option<bool>,
    /// Arbitrary extra attributes for the record.
    pub extra: Map<String, Value>,
}

impl RegisterRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nickname.
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the username (used as the nick when no nick is given).
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the password repeat.
    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.repeat = Some(repeat.into());
        self
    }

    /// Set the initial active state.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Set the initial confirmed state.
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = Some(confirmed);
        self
    }

    /// Attach an extra attribute.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Register a new user.
///
/// The nick falls back to the username, then the email; at least one must
/// be present. Non-reserved extra attributes are copied onto the record.
/// The nick/email existence checks are advisory: check-then-save cannot be
/// atomic here, and the store's own unique constraint is the final
/// arbiter under concurrent registration.
pub async fn register(
    opts: &Options,
    users: &dyn UserStore,
    req: RegisterRequest,
) -> Result<Outcome<User>> {
    let Some(nick) = [&req.nick, &req.username, &req.email]
        .into_iter()
        .find_map(|v| v.as_deref().filter(|s| !s.is_empty()))
    else {
        return Ok(Outcome::denied(Rejection::NickOrEmailMissing));
    };
    let nick = nick.to_string();
    let email = req.email.clone().filter(|e| !e.is_empty());

    let mut user = User {
        id: None,
        nick,
        email,
        name: req.name.clone().unwrap_or_default(),
        active: req.active.unwrap_or(true),
        confirmed: opts.confirm.then(|| req.confirmed.unwrap_or(false)),
        confirmcode: opts.confirm.then(|| Uuid::new_v4().to_string()),
        pass: String::new(),
        salt: String::new(),
        rounds: 0,
        when: Utc::now(),
        extra: copy_extra(&req.extra),
    };

    if users.find_by(UserField::Nick, &user.nick).await?.is_some() {
        return Ok(Outcome::Denied(
            Denied::new(Rejection::NickExists).with_nick(user.nick),
        ));
    }
    if let Some(email) = user.email.as_deref() {
        if users.find_by(UserField::Email, email).await?.is_some() {
            return Ok(Outcome::Denied(
                Denied::new(Rejection::EmailExists).with_nick(user.nick),
            ));
        }
    }

    match password::derive(opts, req.password.as_deref(), req.repeat.as_deref()).await? {
        Outcome::Ok(cred) => {
            user.pass = cred.pass;
            user.salt = cred.salt;
            user.rounds = cred.rounds;
        }
        Outcome::Denied(denied) => return Ok(Outcome::Denied(denied)),
    }

    let user = users.create(user).await?;
    info!(nick = %user.nick, "user registered");
    Ok(Outcome::Ok(user))
}

fn copy_extra(extra: &Map<String, Value>) -> Map<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()) && !key.contains('$'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_opts() -> Options {
        Options {
            rounds: 271,
            ..Default::default()
        }
    }

    fn request(nick: &str) -> RegisterRequest {
        RegisterRequest::new()
            .with_nick(nick)
            .with_password("password123")
            .with_repeat("password123")
    }

    #[tokio::test]
    async fn test_register_success() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let user = register(&opts, &store, request("alice").with_email("alice@example.com"))
            .await
            .unwrap()
            .ok()
            .expect("registration accepted");

        assert!(user.id.is_some());
        assert_eq!(user.nick, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.name, "");
        assert!(user.active);
        assert!(user.confirmed.is_none());
        assert!(!user.pass.is_empty());
        assert!(!user.salt.is_empty());
        assert_eq!(user.rounds, 271);
    }

    #[tokio::test]
    async fn test_nick_falls_back_to_username_then_email() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let user = register(
            &opts,
            &store,
            RegisterRequest::new()
                .with_username("bob")
                .with_password("pw")
                .with_repeat("pw"),
        )
        .await
        .unwrap()
        .ok()
        .unwrap();
        assert_eq!(user.nick, "bob");

        let user = register(
            &opts,
            &store,
            RegisterRequest::new()
                .with_email("carol@example.com")
                .with_password("pw")
                .with_repeat("pw"),
        )
        .await
        .unwrap()
        .ok()
        .unwrap();
        assert_eq!(user.nick, "carol@example.com");
    }

    #[tokio::test]
    async fn test_missing_identity_is_rejected() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let outcome = register(&opts, &store, RegisterRequest::new()).await.unwrap();
        assert_eq!(outcome.why(), Some(&Rejection::NickOrEmailMissing));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_nick_is_rejected() {
        let opts = test_opts();
        let store = MemoryStore::new();

        register(&opts, &store, request("alice")).await.unwrap();

        let outcome = register(&opts, &store, request("alice")).await.unwrap();
        match outcome {
            Outcome::Denied(denied) => {
                assert_eq!(denied.why, Rejection::NickExists);
                assert_eq!(denied.nick.as_deref(), Some("alice"));
            }
            Outcome::Ok(_) => panic!("expected denial"),
        }
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let opts = test_opts();
        let store = MemoryStore::new();

        register(&opts, &store, request("alice").with_email("a@example.com"))
            .await
            .unwrap();

        let outcome = register(&opts, &store, request("bob").with_email("a@example.com"))
            .await
            .unwrap();
        assert_eq!(outcome.why(), Some(&Rejection::EmailExists));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_password_mismatch_saves_nothing() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let outcome = register(
            &opts,
            &store,
            RegisterRequest::new()
                .with_nick("alice")
                .with_password("one")
                .with_repeat("two"),
        )
        .await
        .unwrap();

        assert_eq!(outcome.why(), Some(&Rejection::PasswordMismatch));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_extra_fields_copied_minus_reserved() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let user = register(
            &opts,
            &store,
            request("alice")
                .with_extra("zipcode", "94110")
                .with_extra("role", "admin")
                .with_extra("pass", "sneaky")
                .with_extra("limit$", 10),
        )
        .await
        .unwrap()
        .ok()
        .unwrap();

        assert_eq!(user.extra.get("zipcode"), Some(&Value::from("94110")));
        assert!(!user.extra.contains_key("role"));
        assert!(!user.extra.contains_key("pass"));
        assert!(!user.extra.contains_key("limit$"));
        // the real pass field is untouched by the reserved-key attempt
        assert_ne!(user.pass, "sneaky");
    }

    #[tokio::test]
    async fn test_confirm_assigns_code() {
        let opts = Options {
            confirm: true,
            ..test_opts()
        };
        let store = MemoryStore::new();

        let user = register(&opts, &store, request("alice"))
            .await
            .unwrap()
            .ok()
            .unwrap();

        assert_eq!(user.confirmed, Some(false));
        assert!(user.confirmcode.is_some());
    }

    #[tokio::test]
    async fn test_active_override() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let user = register(&opts, &store, request("alice").with_active(false))
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert!(!user.active);
    }
}
