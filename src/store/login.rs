//! Login record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a login was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginReason {
    /// Password check was bypassed by the caller.
    Auto,
    /// The password verified against the stored credential.
    Password,
}

impl LoginReason {
    /// String form as recorded on login records.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginReason::Auto => "auto",
            LoginReason::Password => "password",
        }
    }
}

impl fmt::Display for LoginReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One successful login. Append-only history, not a singleton per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Login {
    /// Random session token.
    pub id: String,

    /// Id of the user who logged in.
    pub user: String,

    /// Nick of the user who logged in.
    pub nick: String,

    /// When the login happened.
    pub when: DateTime<Utc>,

    /// Whether the session is live.
    pub active: bool,

    /// How the login was authenticated.
    pub reason: LoginReason,

    /// Extra attributes copied from the login request.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_as_str() {
        assert_eq!(LoginReason::Auto.as_str(), "auto");
        assert_eq!(LoginReason::Password.as_str(), "password");
    }

    #[test]
    fn test_reason_serializes_lowercase() {
        let json = serde_json::to_string(&LoginReason::Password).unwrap();
        assert_eq!(json, r#""password""#);
    }

    #[test]
    fn test_login_roundtrip() {
        let login = Login {
            id: "tok-1".to_string(),
            user: "u1".to_string(),
            nick: "alice".to_string(),
            when: Utc::now(),
            active: true,
            reason: LoginReason::Auto,
            extra: Map::new(),
        };
        let json = serde_json::to_string(&login).unwrap();
        let back: Login = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "tok-1");
        assert_eq!(back.reason, LoginReason::Auto);
    }
}
