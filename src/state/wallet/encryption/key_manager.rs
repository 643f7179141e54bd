//! PBKDF2 key derivation for mnemonic encryption
//!
//! Keys are derived with PBKDF2-HMAC-SHA256. The iteration count trades
//! unlock latency against brute-force cost; raise it for stronger protection.

use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::KEY_LEN;
use super::SALT_LEN;

/// Holds an encryption key derived from the user password
pub struct WalletKeyManager {
    /// Derived key (zeroed on drop)
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for WalletKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKeyManager")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl WalletKeyManager {
    /// Derive a 256-bit key from password and salt.
    ///
    /// Same password and salt always give the same key. `iterations` must be
    /// non-zero.
    pub fn from_password(password: &str, salt: &[u8; SALT_LEN], iterations: u32) -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *key);
        Self { key }
    }

    /// Generate random salt, fresh for every encryption
    pub fn generate_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        salt
    }

    pub fn encryption_key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn test_deterministic_derivation() {
        let password = "correct-horse-battery-staple";
        let salt = [42u8; SALT_LEN];

        let km1 = WalletKeyManager::from_password(password, &salt, TEST_ITERATIONS);
        let km2 = WalletKeyManager::from_password(password, &salt, TEST_ITERATIONS);

        assert_eq!(km1.encryption_key(), km2.encryption_key());
    }

    #[test]
    fn test_different_passwords_different_keys() {
        let salt = [42u8; SALT_LEN];

        let km1 = WalletKeyManager::from_password("password1", &salt, TEST_ITERATIONS);
        let km2 = WalletKeyManager::from_password("password2", &salt, TEST_ITERATIONS);

        assert_ne!(km1.encryption_key(), km2.encryption_key());
    }

    #[test]
    fn test_different_salts_different_keys() {
        let password = "same-password";
        let km1 = WalletKeyManager::from_password(password, &[1u8; SALT_LEN], TEST_ITERATIONS);
        let km2 = WalletKeyManager::from_password(password, &[2u8; SALT_LEN], TEST_ITERATIONS);

        assert_ne!(km1.encryption_key(), km2.encryption_key());
    }

    #[test]
    fn test_different_iterations_different_keys() {
        let salt = [7u8; SALT_LEN];

        let km1 = WalletKeyManager::from_password("pw", &salt, TEST_ITERATIONS);
        let km2 = WalletKeyManager::from_password("pw", &salt, TEST_ITERATIONS + 1);

        assert_ne!(km1.encryption_key(), km2.encryption_key());
    }

    #[test]
    fn test_rfc_7914_vector() {
        // PBKDF2-HMAC-SHA256 test vector from RFC 7914 section 11
        let mut key = [0u8; 64];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut key);
        assert_eq!(
            [0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f],
            key[..8]
        );
    }

    #[test]
    fn test_generate_salt_randomness() {
        let salt1 = WalletKeyManager::generate_salt();
        let salt2 = WalletKeyManager::generate_salt();

        // Two generated salts should be different (with overwhelming probability)
        assert_ne!(salt1, salt2);
    }
}
