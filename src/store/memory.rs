//! In-memory store backend.
//!
//! Reference implementation of the store contract, and the backend the test
//! suite runs against. Unlike the advisory checks in the registration
//! workflow, uniqueness enforcement here is authoritative: `create` rejects
//! duplicate non-empty nicks and emails with [`StoreError::Conflict`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Login, LoginStore, Reset, ResetStore, StoreError, User, UserField, UserStore};

/// HashMap-backed store for all three record kinds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    logins: RwLock<Vec<Login>>,
    resets: RwLock<HashMap<String, Reset>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all login records, oldest first.
    pub fn logins(&self) -> Vec<Login> {
        self.logins.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of user records.
    pub fn user_count(&self) -> usize {
        self.users.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by(
        &self,
        field: UserField,
        value: &str,
    ) -> std::result::Result<Option<User>, StoreError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        let found = users.values().find(|u| match field {
            UserField::Nick => u.nick == value,
            UserField::Email => u.email.as_deref() == Some(value),
            UserField::Id => u.id.as_deref() == Some(value),
        });
        Ok(found.cloned())
    }

    async fn create(&self, mut user: User) -> std::result::Result<User, StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());

        if !user.nick.is_empty() && users.values().any(|u| u.nick == user.nick) {
            return Err(StoreError::Conflict("nick"));
        }
        if let Some(email) = user.email.as_deref() {
            if !email.is_empty() && users.values().any(|u| u.email.as_deref() == Some(email)) {
                return Err(StoreError::Conflict("email"));
            }
        }

        let id = user
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> std::result::Result<User, StoreError> {
        let id = user
            .id
            .clone()
            .ok_or_else(|| StoreError::Backend("cannot save a user without an id".to_string()))?;

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if !users.contains_key(&id) {
            return Err(StoreError::Backend(format!("no user with id {id}")));
        }
        users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl LoginStore for MemoryStore {
    async fn create(&self, login: Login) -> std::result::Result<Login, StoreError> {
        let mut logins = self.logins.write().unwrap_or_else(|e| e.into_inner());
        logins.push(login.clone());
        Ok(login)
    }
}

#[async_trait]
impl ResetStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> std::result::Result<Option<Reset>, StoreError> {
        let resets = self.resets.read().unwrap_or_else(|e| e.into_inner());
        Ok(resets.get(id).cloned())
    }

    async fn create(&self, reset: Reset) -> std::result::Result<Reset, StoreError> {
        let mut resets = self.resets.write().unwrap_or_else(|e| e.into_inner());
        resets.insert(reset.id.clone(), reset.clone());
        Ok(reset)
    }

    async fn save(&self, reset: Reset) -> std::result::Result<Reset, StoreError> {
        let mut resets = self.resets.write().unwrap_or_else(|e| e.into_inner());
        if !resets.contains_key(&reset.id) {
            return Err(StoreError::Backend(format!("no reset with id {}", reset.id)));
        }
        resets.insert(reset.id.clone(), reset.clone());
        Ok(reset)
    }
}
