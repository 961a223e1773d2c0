//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, Environment};

pub const CONFIG_FILENAME: &str = "artspace.toml";

/// Load configuration: an explicit path must exist; otherwise search upward
/// for `artspace.toml` and fall back to defaults. Environment overrides are
/// applied last.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_from_path(path)?,
        None => match find_config_file() {
            Some(path) => load_config_from_path(&path)?,
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Option<PathBuf> {
    let mut current = env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Apply `ARTSPACE_*` overrides on top of file values
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("ARTSPACE_ENV") {
        config.environment = match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "development" | "dev" => Environment::Development,
            other => {
                return Err(Error::Config(format!(
                    "ARTSPACE_ENV must be 'development' or 'production', got '{}'",
                    other
                )))
            }
        };
    }
    if let Some(value) = lookup("ARTSPACE_JWT_SECRET") {
        config.auth.jwt_secret = value;
    }
    if let Some(value) = lookup("ARTSPACE_DB_HOST") {
        config.database.host = value;
    }
    if let Some(value) = lookup("ARTSPACE_DB_PORT") {
        config.database.port = value
            .parse()
            .map_err(|_| Error::Config(format!("Invalid ARTSPACE_DB_PORT: {}", value)))?;
    }
    if let Some(value) = lookup("ARTSPACE_DB_USER") {
        config.database.user = value;
    }
    if let Some(value) = lookup("ARTSPACE_DB_PASSWORD") {
        config.database.password = value;
    }
    if let Some(value) = lookup("ARTSPACE_DB_NAME") {
        config.database.dbname = value;
    }
    Ok(())
}

/// Generate a random signing secret (two v4 UUIDs, 244 random bits)
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Default configuration file content with a freshly generated secret
pub fn default_config_content(jwt_secret: &str) -> String {
    format!(
        r#"# Art Space configuration
# Values may reference environment variables: ${{VAR}} or ${{VAR:-default}}

# "development" or "production"
environment = "development"

[server]
host = "0.0.0.0"
port = 5000
# Browser origins allowed to send credentials to the API
allowed_origins = ["http://localhost:5173", "http://localhost:8080"]

[database]
host = "${{DB_HOST:-localhost}}"
port = 5432
user = "${{DB_USER:-postgres}}"
password = "${{DB_PASSWORD:-}}"
dbname = "${{DB_NAME:-art_space}}"

[auth]
# Bearer token signing key. ARTSPACE_JWT_SECRET overrides this value.
jwt_secret = "{jwt_secret}"
token_ttl_hours = 168
session_ttl_minutes = 1440
session_cleanup_secs = 300
bcrypt_cost = 12

[auth.cookie]
name = "artspace_session"
secure = true
# "lax" when the client shares the API's site, "none" for cross-site clients
same_site = "lax"
"#
    )
}

/// Write a default config file, refusing to overwrite an existing one
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::Config(format!("{} already exists", path.display())));
    }
    fs::write(path, default_config_content(&generate_secret()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_interpolation() {
        env::set_var("ARTSPACE_TEST_VAR", "hello");
        let content = "value = \"${ARTSPACE_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("ARTSPACE_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ARTSPACE_ENV", "production"),
            ("ARTSPACE_JWT_SECRET", "from-env"),
            ("ARTSPACE_DB_PORT", "6543"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.database.port, 6543);
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_env_overrides(&mut config, |k| {
            (k == "ARTSPACE_DB_PORT").then(|| "not-a-port".to_string())
        })
        .is_err());
        assert!(apply_env_overrides(&mut config, |k| {
            (k == "ARTSPACE_ENV").then(|| "staging".to_string())
        })
        .is_err());
    }

    #[test]
    fn test_default_content_parses_and_validates() {
        let content = default_config_content("0123456789abcdef0123456789abcdef");
        let config: Config = toml::from_str(&interpolate_env_vars(&content)).unwrap();
        assert_eq!(config.auth.jwt_secret, "0123456789abcdef0123456789abcdef");
        assert_eq!(config.server.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        write_default_config(&path).unwrap();
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.auth.jwt_secret.len(), 64);

        assert!(write_default_config(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_path() {
        let result = load_config_from_path(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }

    #[test]
    fn test_generated_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
        assert!(generate_secret().len() >= super::super::MIN_SECRET_LEN);
    }
}
