//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum JWT secret length accepted in production
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound for `auth.token_ttl_hours` (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Upper bound for `auth.session_ttl_minutes` (one year)
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API with credentials
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:8080".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// PostgreSQL connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_name")]
    pub dbname: String,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "art_space".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            dbname: default_db_name(),
        }
    }
}

impl DatabaseConfig {
    /// libpq-style connection string
    pub fn connection_string(&self) -> String {
        let mut conn = format!(
            "host={} port={} user={} dbname={}",
            self.host, self.port, self.user, self.dbname
        );
        if !self.password.is_empty() {
            conn.push_str(&format!(" password={}", self.password));
        }
        conn
    }
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing key for bearer tokens. Empty means "generate one at
    /// startup", which is only allowed in development.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Idle timeout for server-side sessions
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    #[serde(default = "default_session_cleanup_secs")]
    pub session_cleanup_secs: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default)]
    pub cookie: CookieConfig,
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_session_ttl_minutes() -> i64 {
    24 * 60
}

fn default_session_cleanup_secs() -> u64 {
    300
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            session_ttl_minutes: default_session_ttl_minutes(),
            session_cleanup_secs: default_session_cleanup_secs(),
            bcrypt_cost: default_bcrypt_cost(),
            cookie: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}

/// Session cookie attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,

    #[serde(default = "default_cookie_secure")]
    pub secure: bool,

    /// `none` when the client is served from a different site than the API
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_cookie_name() -> String {
    "artspace_session".to_string()
}

fn default_cookie_secure() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: default_cookie_secure(),
            same_site: SameSite::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_attribute(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Reject settings the server must not start with
    pub fn validate(&self) -> Result<()> {
        let auth = &self.auth;

        if self.is_production() && auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "auth.jwt_secret must be set to at least {} bytes in production (ARTSPACE_JWT_SECRET)",
                MIN_SECRET_LEN
            )));
        }
        if auth.cookie.same_site == SameSite::None && !auth.cookie.secure {
            return Err(Error::Config(
                "auth.cookie.same_site = \"none\" requires auth.cookie.secure = true".to_string(),
            ));
        }
        if !(4..=31).contains(&auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                auth.bcrypt_cost
            )));
        }
        if auth.token_ttl_hours <= 0 || auth.session_ttl_minutes <= 0 {
            return Err(Error::Config(
                "auth.token_ttl_hours and auth.session_ttl_minutes must be positive".to_string(),
            ));
        }
        if auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(Error::Config(format!(
                "auth.token_ttl_hours must be at most {}, got {}",
                MAX_TOKEN_TTL_HOURS, auth.token_ttl_hours
            )));
        }
        if auth.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(Error::Config(format!(
                "auth.session_ttl_minutes must be at most {}, got {}",
                MAX_SESSION_TTL_MINUTES, auth.session_ttl_minutes
            )));
        }
        if auth.session_cleanup_secs == 0 {
            return Err(Error::Config(
                "auth.session_cleanup_secs must be positive".to_string(),
            ));
        }
        if auth.cookie.name.is_empty()
            || !auth
                .cookie
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::Config(format!(
                "Invalid cookie name: {:?}",
                auth.cookie.name
            )));
        }

        Ok(())
    }

    /// Copy with secrets blanked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = "********".to_string();
        }
        if !config.database.password.is_empty() {
            config.database.password = "********".to_string();
        }
        config
    }
}
