//! Configuration for credence.
//!
//! [`Options`] is built once at startup, validated, and then threaded into
//! every call as an immutable value. Nothing in this crate mutates it.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::auth::password::PasswordPolicy;
use crate::{Error, Result};

/// Visibility spec for a single record field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in the serialized record.
    pub name: String,
    /// Whether the field is removed from safe projections.
    #[serde(default)]
    pub hide: bool,
}

impl FieldSpec {
    /// Create a hidden-field spec.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hide: true,
        }
    }
}

/// Field-visibility list for one entity kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityFields {
    /// Per-field visibility specs.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl EntityFields {
    /// Names of the fields marked hidden.
    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.hide)
            .map(|f| f.name.as_str())
    }
}

/// Process-wide options, fixed before any operation.
#[derive(Clone, Deserialize)]
pub struct Options {
    /// PBKDF2 iteration count for newly derived credentials.
    ///
    /// Raising this does not invalidate stored credentials; each record
    /// carries the rounds it was derived with.
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Derived key length in bytes.
    #[serde(default = "default_key_length")]
    pub key_length: usize,

    /// Salt length in bytes (before text encoding).
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Generate a random secret when no password is supplied.
    #[serde(default = "default_autopass")]
    pub autopass: bool,

    /// Require the password repeat argument.
    #[serde(default)]
    pub must_repeat: bool,

    /// New accounts need confirmation; registration assigns a confirm code.
    #[serde(default)]
    pub confirm: bool,

    /// Accept legacy `hex(SHA1(password + salt))` hashes when the primary
    /// comparison fails. Only for records created before the iterated
    /// scheme existed.
    #[serde(default)]
    pub legacy_sha1: bool,

    /// How long a password reset stays usable, in seconds.
    #[serde(default = "default_reset_period")]
    pub reset_period_secs: u64,

    /// Field visibility for user records.
    #[serde(default = "default_user_fields")]
    pub user: EntityFields,

    /// Field visibility for login records.
    #[serde(default)]
    pub login: EntityFields,

    /// Field visibility for reset records.
    #[serde(default)]
    pub reset: EntityFields,

    /// Optional password-strength hook consulted before derivation.
    #[serde(skip)]
    pub policy: Option<Arc<dyn PasswordPolicy>>,
}

fn default_rounds() -> u32 {
    11111
}

fn default_key_length() -> usize {
    128
}

fn default_salt_length() -> usize {
    8
}

fn default_autopass() -> bool {
    true
}

fn default_reset_period() -> u64 {
    24 * 60 * 60
}

fn default_user_fields() -> EntityFields {
    EntityFields {
        fields: vec![
            FieldSpec::hidden("pass"),
            FieldSpec::hidden("salt"),
            FieldSpec::hidden("rounds"),
        ],
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            key_length: default_key_length(),
            salt_length: default_salt_length(),
            autopass: default_autopass(),
            must_repeat: false,
            confirm: false,
            legacy_sha1: false,
            reset_period_secs: default_reset_period(),
            user: default_user_fields(),
            login: EntityFields::default(),
            reset: EntityFields::default(),
            policy: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("rounds", &self.rounds)
            .field("key_length", &self.key_length)
            .field("salt_length", &self.salt_length)
            .field("autopass", &self.autopass)
            .field("must_repeat", &self.must_repeat)
            .field("confirm", &self.confirm)
            .field("legacy_sha1", &self.legacy_sha1)
            .field("reset_period_secs", &self.reset_period_secs)
            .field("policy", &self.policy.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl Options {
    /// Set the password-strength hook.
    pub fn with_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Check that the options are usable.
    ///
    /// Call this once at startup, before serving any request.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::Config("rounds must be positive".to_string()));
        }
        if self.key_length == 0 {
            return Err(Error::Config("key_length must be positive".to_string()));
        }
        if self.salt_length == 0 {
            return Err(Error::Config("salt_length must be positive".to_string()));
        }
        Ok(())
    }
}
