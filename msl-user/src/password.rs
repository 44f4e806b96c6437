//! Password hashing
//!
//! Argon2 with a random salt, stored as a PHC string. Verification parses
//! the stored string, so parameters can evolve without a migration.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use msl_common::Error;

/// Hash a plaintext password into a PHC string
pub fn hash(plain: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hashed = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();
    Ok(hashed)
}

/// Verify a plaintext password against a stored PHC string
pub fn verify(plain: &str, stored: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::Internal(format!("Stored password hash invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let stored = hash("hunter2hunter2").unwrap();
        assert!(verify("hunter2hunter2", &stored).unwrap());
        assert!(!verify("wrong-password", &stored).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        // Random salt per hash
        let a = hash("hunter2hunter2").unwrap();
        let b = hash("hunter2hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_is_an_error() {
        assert!(verify("anything", "not-a-phc-string").is_err());
    }
}
