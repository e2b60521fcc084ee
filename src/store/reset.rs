//! Password reset record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending password reset. Deactivated once executed; stale once older
/// than the configured reset period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reset {
    /// Random reset token.
    pub id: String,

    /// Id of the user the reset is for.
    pub user: String,

    /// Nick of the user the reset is for.
    pub nick: String,

    /// When the reset was requested.
    pub when: DateTime<Utc>,

    /// Whether the reset is still usable.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_roundtrip() {
        let reset = Reset {
            id: "r1".to_string(),
            user: "u1".to_string(),
            nick: "alice".to_string(),
            when: Utc::now(),
            active: true,
        };
        let json = serde_json::to_string(&reset).unwrap();
        let back: Reset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "r1");
        assert!(back.active);
    }
}
