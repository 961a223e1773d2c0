//! PostgreSQL access

mod users;

pub use users::PgUserStore;

use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};

use crate::config::DatabaseConfig;
use crate::error::Result;

const SCHEMA: &str = include_str!("schema.sql");

/// A single multiplexed connection shared by all requests
pub struct Database {
    client: Client,
}

impl Database {
    /// Connect and spawn the connection driver
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        Self::connect_str(&config.connection_string()).await
    }

    pub async fn connect_str(conn_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(conn_string, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    /// Create any missing tables
    pub async fn ensure_schema(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// True when `err` is a unique-constraint violation
pub fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

/// True when `err` is a foreign-key violation
pub fn is_foreign_key_violation(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_unique_email() {
        assert!(SCHEMA
            .lines()
            .any(|l| l.trim_start().starts_with("email") && l.contains("NOT NULL UNIQUE")));
    }

    #[test]
    fn test_schema_keeps_transactions_of_deleted_artworks() {
        let line = SCHEMA
            .lines()
            .find(|l| l.contains("REFERENCES artworks(id)"))
            .unwrap();
        assert!(line.contains("ON DELETE RESTRICT"), "{}", line);
    }

    #[test]
    fn test_schema_is_idempotent() {
        for line in SCHEMA.lines().filter(|l| l.starts_with("CREATE")) {
            assert!(line.contains("IF NOT EXISTS"), "non-idempotent DDL: {}", line);
        }
    }
}
