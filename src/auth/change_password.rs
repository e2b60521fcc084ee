//! Password change.

use tracing::info;

use crate::auth::password;
use crate::auth::resolver::{self, Identity};
use crate::config::Options;
use crate::outcome::{Outcome, Rejection};
use crate::store::{User, UserStore};
use crate::Result;

/// Replace a user's credential material with one derived from a new
/// password.
///
/// Accepts raw hints or an already-resolved user. Derivation failures and
/// mismatch rejections propagate without touching the stored record.
pub async fn change_password(
    opts: &Options,
    users: &dyn UserStore,
    who: impl Into<Identity>,
    password: Option<&str>,
    repeat: Option<&str>,
) -> Result<Outcome<User>> {
    let mut user = match who.into() {
        Identity::Resolved(user) => user,
        Identity::Hints(hints) => match resolver::resolve(users, &hints).await? {
            Some(user) => user,
            None => return Ok(Outcome::denied(Rejection::UserNotFound)),
        },
    };

    match password::derive(opts, password, repeat).await? {
        Outcome::Ok(cred) => {
            user.pass = cred.pass;
            user.salt = cred.salt;
            user.rounds = cred.rounds;
        }
        Outcome::Denied(denied) => return Ok(Outcome::Denied(denied)),
    }

    let user = users.save(user).await?;
    info!(nick = %user.nick, "password changed");
    Ok(Outcome::Ok(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::registration::{register, RegisterRequest};
    use crate::auth::resolver::Hints;
    use crate::store::MemoryStore;

    fn test_opts() -> Options {
        Options {
            rounds: 271,
            ..Default::default()
        }
    }

    async fn seed(store: &MemoryStore, opts: &Options) -> User {
        register(
            opts,
            store,
            RegisterRequest::new()
                .with_nick("alice")
                .with_password("oldpassword")
                .with_repeat("oldpassword"),
        )
        .await
        .unwrap()
        .ok()
        .unwrap()
    }

    #[tokio::test]
    async fn test_change_password() {
        let opts = test_opts();
        let store = MemoryStore::new();
        let before = seed(&store, &opts).await;

        let after = change_password(
            &opts,
            &store,
            Hints::new().with_nick("alice"),
            Some("newpassword"),
            Some("newpassword"),
        )
        .await
        .unwrap()
        .ok()
        .expect("change accepted");

        assert_ne!(before.pass, after.pass);
        assert_ne!(before.salt, after.salt);
        assert!(
            password::verify(&opts, "newpassword", &after.pass, &after.salt, after.rounds)
                .await
                .unwrap()
        );
        assert!(
            !password::verify(&opts, "oldpassword", &after.pass, &after.salt, after.rounds)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_change_password_persists() {
        let opts = test_opts();
        let store = MemoryStore::new();
        let user = seed(&store, &opts).await;

        change_password(&opts, &store, user, Some("newpassword"), Some("newpassword"))
            .await
            .unwrap();

        let stored = store
            .find_by(crate::store::UserField::Nick, "alice")
            .await
            .unwrap()
            .unwrap();
        assert!(
            password::verify(&opts, "newpassword", &stored.pass, &stored.salt, stored.rounds)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_mismatch_leaves_record_untouched() {
        let opts = test_opts();
        let store = MemoryStore::new();
        let before = seed(&store, &opts).await;

        let outcome = change_password(
            &opts,
            &store,
            Hints::new().with_nick("alice"),
            Some("one"),
            Some("two"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.why(), Some(&Rejection::PasswordMismatch));

        let stored = store
            .find_by(crate::store::UserField::Nick, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.pass, before.pass);
        assert_eq!(stored.salt, before.salt);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let opts = test_opts();
        let store = MemoryStore::new();

        let outcome = change_password(
            &opts,
            &store,
            Hints::new().with_nick("nobody"),
            Some("pw"),
            Some("pw"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.why(), Some(&Rejection::UserNotFound));
    }
}
