//! Argon2-backed password hasher adapter.
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool
//! rather than stalling the async executor. Each hash gets a fresh random
//! 16-byte salt; the salt and parameters travel inside the encoded string.

use async_trait::async_trait;
use rand::RngCore;

use crate::domain::auth::RawPassword;
use crate::domain::ports::password_hasher::{HasherError, PasswordHasher};

const SALT_LEN: usize = 16;

/// Password hasher using the Argon2 key derivation function.
#[derive(Default)]
pub struct Argon2Hasher;

fn task_error(err: tokio::task::JoinError) -> HasherError {
    HasherError::new(format!("hashing task failed: {err}"))
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &RawPassword) -> Result<String, HasherError> {
        let password = password.reveal().as_bytes().to_vec();
        tokio::task::spawn_blocking(move || {
            let mut salt = [0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);
            argon2::hash_encoded(&password, &salt, &argon2::Config::default())
        })
        .await
        .map_err(task_error)?
        .map_err(|err| HasherError::new(err.to_string()))
    }

    async fn verify(&self, password: &RawPassword, encoded: &str) -> Result<bool, HasherError> {
        let password = password.reveal().as_bytes().to_vec();
        let encoded = encoded.to_owned();
        tokio::task::spawn_blocking(move || argon2::verify_encoded(&encoded, &password))
            .await
            .map_err(task_error)?
            .map_err(|err| HasherError::new(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> RawPassword {
        RawPassword::new(raw.to_owned()).expect("valid password")
    }

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hasher = Argon2Hasher;
        let encoded = hasher.hash(&password("secret1")).await.expect("hash");

        assert!(encoded.starts_with("$argon2"));
        assert!(hasher
            .verify(&password("secret1"), &encoded)
            .await
            .expect("verify"));
        assert!(!hasher
            .verify(&password("secret2"), &encoded)
            .await
            .expect("verify"));
    }

    #[tokio::test]
    async fn two_hashes_of_the_same_password_differ() {
        let hasher = Argon2Hasher;
        let first = hasher.hash(&password("secret1")).await.expect("hash");
        let second = hasher.hash(&password("secret1")).await.expect("hash");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_encoded_hash_is_an_error() {
        let hasher = Argon2Hasher;
        let err = hasher
            .verify(&password("secret1"), "not-an-encoded-hash")
            .await
            .expect_err("malformed hash");
        assert!(!err.message.is_empty());
    }
}
