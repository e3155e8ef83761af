/// Password Hashing and Verification
///
/// One-way bcrypt hashing of admin passwords. The salt is generated per hash
/// and stored inside the hash string, so two hashes of the same password differ.

use bcrypt::{hash, verify};

use crate::configuration::PasswordSettings;
use crate::error::AppError;

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_settings(settings: &PasswordSettings) -> Self {
        Self::new(settings.hash_cost)
    }

    /// Hash a password using bcrypt
    ///
    /// # Errors
    /// Returns error only if bcrypt rejects the configured cost
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a password against a stored hash.
    ///
    /// A stored hash bcrypt cannot parse counts as a mismatch.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        match verify(password, password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(4)
    }

    #[test]
    fn test_hash_password() {
        let password = "password123";
        let hash = hasher().hash(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("password123").expect("Failed to hash password");

        assert!(hasher.verify("password123", &hash));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hasher = hasher();
        let hash = hasher.hash("correctpassword").expect("Failed to hash password");

        assert!(!hasher.verify("wrongpassword", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("password123").unwrap();
        let second = hasher.hash("password123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("password123", &first));
        assert!(hasher.verify("password123", &second));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!hasher().verify("password123", "not-a-bcrypt-hash"));
        assert!(!hasher().verify("password123", ""));
    }

    #[test]
    fn test_invalid_cost_fails() {
        assert!(CredentialHasher::new(2).hash("password123").is_err());
    }
}
