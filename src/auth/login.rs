//! Login issuance.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password;
use crate::auth::resolver::{self, Identity};
use crate::config::Options;
use crate::outcome::{Denied, Outcome, Rejection};
use crate::store::{Login, LoginReason, LoginStore, User, UserStore};
use crate::Result;

/// Input fields with a meaning of their own; never copied onto the login
/// record.
const RESERVED_FIELDS: &[&str] = &["role", "cmd", "password"];

/// Login request data.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Who is logging in: raw hints or an already-resolved user.
    pub who: Identity,
    /// Password to verify.
    pub password: Option<String>,
    /// Skip password verification. For callers that have already
    /// authenticated the user by other means.
    pub auto: bool,
    /// Extra attributes for the login record.
    pub extra: Map<String, Value>,
}

impl LoginRequest {
    /// Create a request for the given identity.
    pub fn new(who: impl Into<Identity>) -> Self {
        Self {
            who: who.into(),
            password: None,
            auto: false,
            extra: Map::new(),
        }
    }

    /// Set the password to verify.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Skip password verification.
    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    /// Attach an extra attribute.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A granted login.
#[derive(Debug, Clone)]
pub struct Grant {
    /// The authenticated user.
    pub user: User,
    /// The persisted login record; its `reason` says how authentication
    /// happened.
    pub login: Login,
}

/// Authenticate a user and append a login record.
///
/// Inactive accounts are refused before any password work. On success a
/// login record with a fresh random token is persisted; no record is
/// written for refused attempts.
pub async fn login(
    opts: &Options,
    users: &dyn UserStore,
    logins: &dyn LoginStore,
    req: LoginRequest,
) -> Result<Outcome<Grant>> {
    let user = match req.who {
        Identity::Resolved(user) => user,
        Identity::Hints(hints) => match resolver::resolve(users, &hints).await? {
            Some(user) => user,
            None => return Ok(Outcome::denied(Rejection::UserNotFound)),
        },
    };

    if !user.active {
        warn!(nick = %user.nick, "login refused, account not active");
        return Ok(Outcome::Denied(
            Denied::new(Rejection::NotActive).with_user(user),
        ));
    }

    let reason = if req.auto {
        LoginReason::Auto
    } else {
        let proposed = req.password.as_deref().unwrap_or_default();
        let ok = password::verify(opts, proposed, &user.pass, &user.salt, user.rounds).await?;
        if !ok {
            warn!(nick = %user.nick, "login refused, invalid password");
            return Ok(Outcome::denied(Rejection::InvalidPassword));
        }
        LoginReason::Password
    };

    let login = Login {
        id: Uuid::new_v4().to_string(),
        user: user.id.clone().unwrap_or_default(),
        nick: user.nick.clone(),
        when: Utc::now(),
        active: true,
        reason,
        extra: copy_extra(&req.extra),
    };
    let login = logins.create(login).await?;

    info!(nick = %user.nick, reason = %reason, "login issued");
    Ok(Outcome::Ok(Grant { user, login }))
}

fn copy_extra(extra: &Map<String, Value>) -> Map<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()) && !key.contains('$'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
