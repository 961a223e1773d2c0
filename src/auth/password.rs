//! Password hashing (bcrypt)

use crate::error::{Error, Result};

/// Hashes and verifies passwords with bcrypt at a fixed cost.
///
/// Hashing is CPU bound, so both operations run on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Verified against when the email is unknown, so a miss costs the same
    /// as a wrong password.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh salt
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        let digest = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
        Ok(digest)
    }

    /// Check a plaintext password against a stored digest
    pub async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
            .await?
            .map_err(|e| {
                tracing::error!("Stored password digest is unreadable: {}", e);
                Error::Internal("Stored password digest is unreadable".to_string())
            })
    }

    /// Burn one verification for a login against an unknown account
    pub async fn verify_dummy(&self, plaintext: &str) -> Result<()> {
        let _ = self.verify(plaintext, &self.dummy_hash).await?;
        Ok(())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
