//! Password derivation and verification.
//!
//! Uses PBKDF2-HMAC-SHA512 with a random per-credential salt. The salt,
//! iteration count and derived hash travel together on the stored record,
//! so the global `rounds` option can be raised at any time without
//! invalidating existing credentials: verification always replays the
//! parameters the record was derived with.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand_core::{OsRng, RngCore};
use sha1::{Digest, Sha1};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use tokio::task;
use tracing::debug;

use crate::config::Options;
use crate::outcome::{Outcome, Rejection};
use crate::{Error, Result};

/// Password-strength hook consulted before derivation.
///
/// The default configuration has none. Implementations return the reason a
/// password is unacceptable; derivation surfaces it as a `password_weak`
/// rejection.
pub trait PasswordPolicy: Send + Sync {
    /// Check a candidate password, returning the reason it is refused.
    fn check(&self, password: &str) -> std::result::Result<(), String>;
}

/// Freshly derived credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Derived hash, base64.
    pub pass: String,
    /// Salt, base64.
    pub salt: String,
    /// Iteration count used.
    pub rounds: u32,
}

/// Derive credential material from a password.
///
/// With no password: generates a random secret when `autopass` is enabled
/// (the secret is hashed and discarded, never returned; such accounts go
/// through the reset flow), otherwise fails with [`Error::NoPassword`].
/// With no repeat: fails with [`Error::NoPasswordRepeat`] when `must_repeat`
/// is enabled, otherwise the repeat defaults to the password itself.
/// A password/repeat mismatch is a `password_mismatch` rejection, not an
/// error.
///
/// The key derivation itself runs on a blocking worker thread.
pub async fn derive(
    opts: &Options,
    password: Option<&str>,
    repeat: Option<&str>,
) -> Result<Outcome<Credential>> {
    let password = match password {
        Some(p) => p.to_string(),
        None if opts.autopass => random_text(opts.salt_length),
        None => return Err(Error::NoPassword),
    };

    let repeat = match repeat {
        Some(r) => r.to_string(),
        None if opts.must_repeat => return Err(Error::NoPasswordRepeat),
        None => password.clone(),
    };

    if password != repeat {
        return Ok(Outcome::denied(Rejection::PasswordMismatch));
    }

    if let Some(policy) = &opts.policy {
        if let Err(why) = policy.check(&password) {
            return Ok(Outcome::denied(Rejection::PasswordWeak(why)));
        }
    }

    let salt = random_text(opts.salt_length);
    let rounds = opts.rounds;
    let key_length = opts.key_length;
    let pass = {
        let salt = salt.clone();
        task::spawn_blocking(move || derive_hash(&password, &salt, rounds, key_length))
            .await
            .map_err(|e| Error::Hash(e.to_string()))?
    };

    Ok(Outcome::Ok(Credential { pass, salt, rounds }))
}

/// Verify a proposed password against stored credential material.
///
/// The stored record's own salt and rounds are used, and the key length is
/// recovered from the stored hash itself; current global options play no
/// part in the primary comparison. A mismatch is `Ok(false)`, never an
/// error.
///
/// When `legacy_sha1` is enabled and the primary comparison fails, a
/// `hex(SHA1(proposed + salt))` digest is compared instead. Both paths
/// return the same plain `bool`; callers cannot tell which scheme was
/// consulted.
pub async fn verify(
    opts: &Options,
    proposed: &str,
    pass: &str,
    salt: &str,
    rounds: u32,
) -> Result<bool> {
    let legacy_sha1 = opts.legacy_sha1;
    let proposed = proposed.to_string();
    let pass = pass.to_string();
    let salt = salt.to_string();

    task::spawn_blocking(move || check(&proposed, &pass, &salt, rounds, legacy_sha1))
        .await
        .map_err(|e| Error::Hash(e.to_string()))
}

fn check(proposed: &str, pass: &str, salt: &str, rounds: u32, legacy_sha1: bool) -> bool {
    // The decoded stored hash fixes the key length. A record that does not
    // decode cannot match the primary scheme.
    let primary = match BASE64.decode(pass) {
        Ok(stored) if !stored.is_empty() => {
            let derived = derive_key(proposed, salt, rounds, stored.len());
            bool::from(derived.ct_eq(&stored))
        }
        _ => false,
    };

    if primary || !legacy_sha1 {
        return primary;
    }

    // Records hashed before the iterated scheme existed.
    let mut sha = Sha1::new();
    sha.update(proposed.as_bytes());
    sha.update(salt.as_bytes());
    let legacy = hex::encode(sha.finalize());
    let ok = bool::from(legacy.as_bytes().ct_eq(pass.as_bytes()));
    if ok {
        debug!("credential verified via legacy digest");
    }
    ok
}

fn derive_key(password: &str, salt: &str, rounds: u32, key_length: usize) -> Vec<u8> {
    // The salt text itself feeds the KDF; records keep whatever salt
    // encoding they were created with.
    let mut key = vec![0u8; key_length];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), rounds, &mut key);
    key
}

fn derive_hash(password: &str, salt: &str, rounds: u32, key_length: usize) -> String {
    BASE64.encode(derive_key(password, salt, rounds, key_length))
}

fn random_text(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}
