//! Password hashing using argon2
//!
//! New hashes are argon2id. Accounts imported from the previous system carry
//! bcrypt hashes (`$2a$`, `$2b$`, `$2y$`); those still verify.
//!
//! Hashing and verification are intentionally CPU-intensive. Use the
//! `_async` variants from request handlers so the work runs on the
//! blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

/// Hash checked when a login names no usable account, computed on first use
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored argon2 or bcrypt hash (blocking operation)
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| anyhow::anyhow!("Invalid bcrypt hash: {}", e));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Argon2 hash with the same cost parameters as real account hashes
    pub fn dummy_hash() -> Result<&'static str> {
        if let Some(hash) = DUMMY_HASH.get() {
            return Ok(hash);
        }
        let hash = Self::hash("technotes-dummy-password")?;
        Ok(DUMMY_HASH.get_or_init(|| hash))
    }

    /// Run a full verification against the dummy hash and discard the result.
    ///
    /// Logins for unknown or inactive users call this so they take as long as
    /// a wrong password for an existing user.
    pub async fn verify_dummy_async(password: String) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            Self::verify(&password, Self::dummy_hash()?).map(|_| ())
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| hash.starts_with(p))
}
