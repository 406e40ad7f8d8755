//! Argon2id hashing of one-time codes

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use vg_shared::HasherConfig;

use crate::errors::{DomainError, DomainResult};

/// Salted one-way hasher for verification codes
///
/// Digests are PHC strings, so the salt and cost parameters travel with
/// them and a change of [`HasherConfig`] does not invalidate outstanding
/// codes.
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    /// Create a hasher with the given cost parameters
    pub fn new(config: &HasherConfig) -> DomainResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid Argon2 parameters: {}", e),
            })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext code with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> DomainResult<String> {
        let mut salt_bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| DomainError::EntropySourceUnavailable {
                message: e.to_string(),
            })?;

        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode salt: {}", e),
        })?;

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash code: {}", e),
            })
    }

    /// Check a plaintext code against a digest
    ///
    /// A malformed digest never matches.
    pub fn matches(&self, digest: &str, plaintext: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_async(&self, plaintext: String) -> DomainResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Hashing task failed: {}", e),
            })?
    }

    /// [`matches`](Self::matches) on the blocking thread pool
    pub async fn matches_async(&self, digest: String, plaintext: String) -> DomainResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.matches(&digest, &plaintext))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Hash comparison task failed: {}", e),
            })
    }
}

impl std::fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}
