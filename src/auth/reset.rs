//! Password reset workflow.
//!
//! A reset is a short-lived token bound to one user. Executing it changes
//! the password and deactivates the token; tokens older than the configured
//! reset period refuse to execute.

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::auth::change_password::change_password;
use crate::auth::resolver::{self, Identity};
use crate::config::Options;
use crate::outcome::{Outcome, Rejection};
use crate::store::{Reset, ResetStore, User, UserField, UserStore};
use crate::Result;

/// A loaded reset together with the user it is for.
#[derive(Debug, Clone)]
pub struct ResetContext {
    /// The reset record.
    pub reset: Reset,
    /// The user the reset belongs to.
    pub user: User,
}

/// Create a reset record for a user.
pub async fn create_reset(
    users: &dyn UserStore,
    resets: &dyn ResetStore,
    who: impl Into<Identity>,
) -> Result<Outcome<Reset>> {
    let user = match who.into() {
        Identity::Resolved(user) => user,
        Identity::Hints(hints) => match resolver::resolve(users, &hints).await? {
            Some(user) => user,
            None => return Ok(Outcome::denied(Rejection::UserNotFound)),
        },
    };

    let reset = Reset {
        id: Uuid::new_v4().to_string(),
        user: user.id.clone().unwrap_or_default(),
        nick: user.nick.clone(),
        when: Utc::now(),
        active: true,
    };
    let reset = resets.create(reset).await?;

    info!(nick = %user.nick, "password reset created");
    Ok(Outcome::Ok(reset))
}

/// Load a reset by token and check it is still usable.
///
/// Inactive or unknown tokens are `reset-not-found`; tokens older than the
/// configured reset period are `reset-expired`.
pub async fn load_reset(
    opts: &Options,
    users: &dyn UserStore,
    resets: &dyn ResetStore,
    token: &str,
) -> Result<Outcome<ResetContext>> {
    let Some(reset) = resets.find_by_id(token).await? else {
        return Ok(Outcome::denied(Rejection::ResetNotFound));
    };
    if !reset.active {
        return Ok(Outcome::denied(Rejection::ResetNotFound));
    }
    if Utc::now() - reset.when > Duration::seconds(opts.reset_period_secs as i64) {
        return Ok(Outcome::denied(Rejection::ResetExpired));
    }

    let Some(user) = users.find_by(UserField::Id, &reset.user).await? else {
        return Ok(Outcome::denied(Rejection::UserNotFound));
    };

    Ok(Outcome::Ok(ResetContext { reset, user }))
}

/// Execute a reset: change the user's password and deactivate the token.
pub async fn execute_reset(
    opts: &Options,
    users: &dyn UserStore,
    resets: &dyn ResetStore,
    token: &str,
    password: Option<&str>,
    repeat: Option<&str>,
) -> Result<Outcome<User>> {
    let context = match load_reset(opts, users, resets, token).await? {
        Outcome::Ok(context) => context,
        Outcome::Denied(denied) => return Ok(Outcome::Denied(denied)),
    };

    let user = match change_password(opts, users, context.user, password, repeat).await? {
        Outcome::Ok(user) => user,
        Outcome::Denied(denied) => return Ok(Outcome::Denied(denied)),
    };

    let mut reset = context.reset;
    reset.active = false;
    resets.save(reset).await?;

    info!(nick = %user.nick, "password reset executed");
    Ok(Outcome::Ok(user))
}
