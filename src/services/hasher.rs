use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;

use super::CollaboratorError;
use crate::config::PasswordHashConfig;

/// Password hashing collaborator
#[async_trait]
pub trait Hasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String, CollaboratorError>;
    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CollaboratorError>;
}

/// argon2id with a cost fixed at construction time.
///
/// Hashing runs on the blocking pool so a slow cost setting never stalls the
/// async workers.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &PasswordHashConfig) -> Result<Self, CollaboratorError> {
        let params = Params::new(config.memory_kib, config.cost, config.parallelism, None)
            .map_err(|e| CollaboratorError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait]
impl Hasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> Result<String, CollaboratorError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CollaboratorError::Hashing(e.to_string()))
        })
        .await?
    }

    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CollaboratorError> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();

        tokio::task::spawn_blocking(move || -> Result<bool, CollaboratorError> {
            let parsed = PasswordHash::new(&digest)
                .map_err(|e| CollaboratorError::Hashing(format!("Invalid hash: {}", e)))?;
            // Cost parameters come from the PHC string itself
            Ok(Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok())
        })
        .await?
    }
}
