use argon2::password_hash::{rand_core::OsRng as PwdRng, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::utils::error::{Error, Result};

/// Argon2 PHC string for storage. Plaintext never leaves this function.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut PwdRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| Error::Unexpected("failed to hash password".into()))?;
    Ok(hash.to_string())
}

/// Verify an Argon2 hash stored at creation time.
pub fn verify_password(stored_hash: &str, plain: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| Error::Unexpected("invalid stored password hash".into()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// 32 random bytes, hex-encoded. Used as the raw email-verification token;
/// only its sha256 ever hits the database.
pub fn random_token_hex() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");
        assert!(verify_password(&hash, "correct horse battery").unwrap());
        assert!(!verify_password(&hash, "wrong password").unwrap());
    }

    #[test]
    fn token_is_high_entropy_hex() {
        let a = random_token_hex();
        let b = random_token_hex();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sha256_is_stable() {
        assert_eq!(sha256_hex("abc"), sha256_hex("abc"));
        assert_ne!(sha256_hex("abc"), sha256_hex("abd"));
        assert_eq!(sha256_hex("abc").len(), 64);
    }
}
