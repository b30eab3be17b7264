//! Password hashing with Argon2id
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{ApiError, ApiResult};

/// Salted one-way password hashing
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Argon2id with the crate's default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with custom cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password into a PHC string with a random salt
    pub async fn hash(&self, password: &str) -> ApiResult<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| ApiError::PasswordHash(format!("hashing failed: {}", e)))
        })
        .await?
    }

    /// Check a password against a stored PHC string
    ///
    /// # Errors
    /// `ApiError::PasswordHash` if the stored hash cannot be parsed
    pub async fn verify(&self, password: &str, hash: &str) -> ApiResult<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| ApiError::PasswordHash(format!("invalid stored hash: {}", e)))?;
            Ok(argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fast() -> PasswordService {
        PasswordService::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let passwords = fast();
        for password in ["hunter22", "correct horse battery staple", "пароль-ü"] {
            let hash = passwords.hash(password).await.unwrap();
            assert!(hash.starts_with("$argon2id$"));
            assert_ne!(hash, password);
            assert!(passwords.verify(password, &hash).await.unwrap());
            assert!(!passwords.verify("wrong-password", &hash).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let passwords = fast();
        let first = passwords.hash("hunter22").await.unwrap();
        let second = passwords.hash("hunter22").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_default_params_verify_fast_hash() {
        // Parameters are read from the PHC string, not the verifier
        let hash = fast().hash("hunter22").await.unwrap();
        assert!(PasswordService::new().verify("hunter22", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let result = fast().verify("hunter22", "not-a-phc-string").await;
        assert_matches!(result, Err(ApiError::PasswordHash(_)));
    }
}
