//! Authentication module for credence.
//!
//! Password derivation and verification, identity resolution, and the
//! registration, login, change-password and reset workflows.

mod change_password;
mod login;
pub(crate) mod password;
mod registration;
mod resolver;
mod reset;

use serde_json::Value;

pub use change_password::change_password;
pub use login::{login, Grant, LoginRequest};
pub use password::{derive, verify, Credential, PasswordPolicy};
pub use registration::{register, RegisterRequest};
pub use resolver::{resolve, Hints, Identity};
pub use reset::{create_reset, execute_reset, load_reset, ResetContext};

/// Keys whose values never belong in descriptive or log output.
const SECRET_FIELDS: &[&str] = &["password", "repeat", "proposed"];

/// Replace secret values in descriptive data with `"[HIDDEN]"`.
///
/// Intended for request data that is about to be logged or echoed back.
/// Only top-level keys are touched; non-object values pass through
/// unchanged.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    if SECRET_FIELDS.contains(&key.as_str()) {
                        (key.clone(), Value::String("[HIDDEN]".to_string()))
                    } else {
                        (key.clone(), value.clone())
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
