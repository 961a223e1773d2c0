//! Credential store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::models::{normalize_email, NewUser, User};
use crate::error::{Error, Result};

/// Persistence for user accounts
///
/// `create_user` must fail with [`Error::Conflict`] when the email is taken,
/// including when a concurrent insert wins the race.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<i32>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>>;
}

pub fn duplicate_email() -> Error {
    Error::Conflict("Email already exists".to_string())
}

/// Process-local store used when no database is configured
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<MemoryUsers>>,
}

#[derive(Default)]
struct MemoryUsers {
    next_id: i32,
    by_id: HashMap<i32, User>,
    by_email: HashMap<String, i32>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<i32> {
        let email = normalize_email(&user.email);
        let mut users = self.inner.write().await;

        if users.by_email.contains_key(&email) {
            return Err(duplicate_email());
        }

        users.next_id += 1;
        let id = users.next_id;
        users.by_email.insert(email.clone(), id);
        users.by_id.insert(
            id,
            User {
                id,
                name: user.name,
                email,
                password_hash: user.password_hash,
                role: user.role,
                created_at: chrono::Utc::now(),
            },
        );
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.inner.read().await;
        Ok(users
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "A".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: Role::Artist,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let id = store.create_user(new_user("a@x.com")).await.unwrap();

        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Artist);
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();

        let err = store.create_user(new_user("A@X.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_signups_create_one_record() {
        let store = MemoryUserStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_user(new_user("race@x.com")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryUserStore::new();
        assert!(store.is_empty().await);
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }
}
