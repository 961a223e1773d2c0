//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Artist - owns a portfolio, sells work
    Artist,
    /// Collector - browses and buys
    #[serde(alias = "collector")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artist => "artist",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist" => Ok(Role::Artist),
            "user" | "collector" => Ok(Role::User),
            other => Err(Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A stored account
///
/// `password_hash` never leaves the credential store through serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Validated input for the credential store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Where a request's identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    Session,
    Token,
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthSource::Session => f.write_str("session"),
            AuthSource::Token => f.write_str("token"),
        }
    }
}

/// Identity resolved for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: i32,
    pub role: Role,
    pub source: AuthSource,
}

impl AuthContext {
    pub fn is_artist(&self) -> bool {
        self.role == Role::Artist
    }
}

/// Identity resolved for a route restricted to artists
#[derive(Debug, Clone)]
pub struct ArtistContext(pub AuthContext);

/// Signup body. Fields are optional so missing ones produce a 400, not a
/// deserializer rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// A signup body with every field present and non-blank
#[derive(Debug)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignupRequest {
    pub fn validate(self) -> Result<ValidSignup> {
        let name = required(self.name)?.trim().to_string();
        let email = normalize_email(&required(self.email)?);
        let password = required(self.password)?;
        let role = required(self.role)?.parse::<Role>()?;

        if !email.contains('@') {
            return Err(Error::Validation("Invalid email address".to_string()));
        }

        Ok(ValidSignup {
            name,
            email,
            password,
            role,
        })
    }
}

/// Login credentials
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(email, password)` when both are present
    pub fn validate(self) -> Result<(String, String)> {
        let email = normalize_email(&required(self.email)?);
        let password = required(self.password)?;
        Ok((email, password))
    }
}

/// Login response with token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: Role,
    pub name: String,
    pub id: i32,
    pub token: String,
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::missing_fields()),
    }
}
