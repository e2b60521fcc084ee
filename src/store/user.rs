//! User record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::EntityFields;

/// A registered user.
///
/// Credential fields (`pass`, `salt`, `rounds`) never appear in serialized
/// output; a persistence collaborator reads them from the struct directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned record id. `None` until first persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unique nickname.
    pub nick: String,

    /// Unique email address, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Whether the account may log in.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Whether the account has been confirmed. Only set when confirmation
    /// is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,

    /// Confirmation code assigned at registration. Only set when
    /// confirmation is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmcode: Option<String>,

    /// Password hash, base64.
    #[serde(default, skip_serializing)]
    pub pass: String,

    /// Salt the hash was derived with, base64.
    #[serde(default, skip_serializing)]
    pub salt: String,

    /// Iteration count the hash was derived with.
    #[serde(default, skip_serializing)]
    pub rounds: u32,

    /// Creation timestamp.
    pub when: DateTime<Utc>,

    /// Extra attributes copied from registration input.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Safe projection of this user for output shaping.
    ///
    /// Serializes the record and removes every field the visibility list
    /// marks hidden. Credential fields are already excluded by
    /// serialization regardless of the list.
    pub fn safe(&self, fields: &EntityFields) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            for name in fields.hidden() {
                map.remove(name);
            }
        }
        value
    }
}
