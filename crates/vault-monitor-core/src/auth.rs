//! Shared-password authentication for mutating operations

use crate::error::{MonitorError, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Checks the password submitted with a mutating request
pub trait Authenticator: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

/// Verifies passwords against a single salted Argon2 hash (PHC string)
pub struct PasswordAuthenticator {
    password_hash: String,
}

impl PasswordAuthenticator {
    /// Build from a PHC hash string, rejecting malformed hashes up front
    pub fn from_hash(password_hash: impl Into<String>) -> Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| MonitorError::PasswordHash(format!("Invalid password hash: {}", e)))?;
        Ok(Self { password_hash })
    }

    /// Build by hashing a plaintext password with a fresh salt
    pub fn from_password(password: &str) -> Result<Self> {
        Self::from_hash(hash_password(password)?)
    }
}

impl Authenticator for PasswordAuthenticator {
    fn verify(&self, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password into a PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MonitorError::PasswordHash(format!("Failed to hash password: {}", e)))?
        .to_string())
}
