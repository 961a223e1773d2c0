//! PostgreSQL-backed credential store

use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

use super::{is_unique_violation, Database};
use crate::auth::models::{normalize_email, NewUser, Role, User};
use crate::auth::store::{duplicate_email, UserStore};
use crate::error::{Error, Result};

pub struct PgUserStore {
    db: Arc<Database>,
}

impl PgUserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role
            .parse::<Role>()
            .map_err(|_| Error::Internal(format!("Unknown role '{}' in users table", role)))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<i32> {
        let email = normalize_email(&user.email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(duplicate_email());
        }

        // The UNIQUE constraint settles concurrent signups for the same email.
        let row = self
            .db
            .client()
            .query_one(
                "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING id",
                &[&user.name, &email, &user.password_hash, &user.role.as_str()],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_email()
                } else {
                    Error::Database(e)
                }
            })?;

        Ok(row.try_get("id")?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .db
            .client()
            .query_opt(
                "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
                &[&normalize_email(email)],
            )
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let row = self
            .db
            .client()
            .query_opt(
                "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1",
                &[&id],
            )
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}
