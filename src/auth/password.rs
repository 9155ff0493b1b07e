/// Password Hashing and Verification
///
/// bcrypt hashes are self-describing (`$2b$<cost>$<salt><digest>`), so
/// verification always uses the cost and salt embedded in the stored hash,
/// never the cost this hasher was configured with.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::HashError;

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher {
    /// Hasher producing digests at the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt
    ///
    /// Password policy is the caller's concern; see `validators::is_valid_password`.
    ///
    /// # Errors
    /// Returns `HashError::Failure` if bcrypt cannot produce a digest
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        hash(plaintext, self.cost).map_err(|e| HashError::Failure(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// `Ok(false)` on mismatch. Errors only when the stored hash cannot be parsed.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, HashError> {
        verify(plaintext, stored_hash).map_err(|_| HashError::MalformedHash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        // Minimum bcrypt cost keeps the tests fast
        CredentialHasher::new(4)
    }

    #[test]
    fn test_hash_password() {
        let hash = hasher().hash("secret12").expect("Failed to hash password");

        assert_ne!(hash, "secret12");
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$04$"), "cost should be embedded: {}", hash);
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hasher().hash("secret12").unwrap();
        let second = hasher().hash("secret12").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let hash = hasher().hash("secret12").unwrap();
        assert_eq!(hasher().verify("secret12", &hash), Ok(true));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hasher().hash("secret12").unwrap();
        assert_eq!(hasher().verify("secret13", &hash), Ok(false));
        assert_eq!(hasher().verify("", &hash), Ok(false));
    }

    #[test]
    fn test_verify_uses_embedded_cost() {
        let hash = CredentialHasher::new(5).hash("secret12").unwrap();
        assert_eq!(CredentialHasher::new(12).verify("secret12", &hash), Ok(true));
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(
            hasher().verify("secret12", "not-a-bcrypt-hash"),
            Err(HashError::MalformedHash)
        );
    }

    #[test]
    fn test_invalid_cost_fails() {
        assert!(matches!(
            CredentialHasher::new(2).hash("secret12"),
            Err(HashError::Failure(_))
        ));
    }
}
