//! Password input and strength checks for mnemonic encryption
//!
//! Handles interactive password input, strength validation, and environment variable fallback.

use anyhow::anyhow;
use anyhow::Result;
use rpassword::prompt_password;
use zeroize::Zeroizing;

/// Environment variable holding the vault password (INSECURE - only for testing/automation)
pub const VAULT_PASSWORD_ENV_VAR: &str = "WALLET_VAULT_PASSWORD";

/// Password strength classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    /// Very weak: < 8 characters
    VeryWeak,
    /// Weak: 8-11 characters
    Weak,
    /// Moderate: 12-15 characters, basic complexity
    Moderate,
    /// Strong: 16+ characters with good complexity
    Strong,
    /// Very Strong: 20+ characters with excellent complexity
    VeryStrong,
}

impl PasswordStrength {
    /// Check if strength meets minimum security requirements
    pub fn is_acceptable(&self) -> bool {
        *self >= PasswordStrength::Moderate
    }

    pub fn description(&self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "Very Weak (unacceptable)",
            PasswordStrength::Weak => "Weak (unacceptable)",
            PasswordStrength::Moderate => "Moderate (acceptable)",
            PasswordStrength::Strong => "Strong (recommended)",
            PasswordStrength::VeryStrong => "Very Strong (excellent)",
        }
    }
}

/// Manages password input and validation
#[derive(Debug, Clone, Copy)]
pub struct PasswordManager;

impl PasswordManager {
    /// Ask for a new password twice and check its strength.
    ///
    /// Returns an error if the password is too weak or the two entries differ.
    pub fn prompt_new_password() -> Result<Zeroizing<String>> {
        let password = Zeroizing::new(prompt_password("New vault password: ")?);

        let strength = Self::analyze_strength(&password);
        if !strength.is_acceptable() {
            return Err(anyhow!(
                "Password is too weak: {}. Minimum: 12 characters with mixed case, numbers, and symbols.",
                strength.description()
            ));
        }

        let confirm = Zeroizing::new(prompt_password("Confirm vault password: ")?);
        if *password != *confirm {
            return Err(anyhow!("Passwords do not match"));
        }

        Ok(password)
    }

    /// Prompt user to enter existing password
    pub fn prompt_unlock_password() -> Result<Zeroizing<String>> {
        let password = Zeroizing::new(prompt_password("Vault password: ")?);

        if password.is_empty() {
            return Err(anyhow!("Password cannot be empty"));
        }

        Ok(password)
    }

    /// Get password from environment variable (for automation/testing)
    ///
    /// ⚠️ WARNING: Environment variables are not secure!
    pub fn from_env_var(var_name: &str) -> Option<Zeroizing<String>> {
        std::env::var(var_name).ok().map(Zeroizing::new)
    }

    /// Analyze password strength
    ///
    /// Length sets the baseline; poor character diversity (case, digits,
    /// symbols) downgrades it by one level.
    pub fn analyze_strength(password: &str) -> PasswordStrength {
        let len = password.chars().count();

        let base_strength = match len {
            0..=7 => PasswordStrength::VeryWeak,
            8..=11 => PasswordStrength::Weak,
            12..=15 => PasswordStrength::Moderate,
            16..=19 => PasswordStrength::Strong,
            _ => PasswordStrength::VeryStrong,
        };

        let has_lowercase = password.chars().any(|c| c.is_lowercase());
        let has_uppercase = password.chars().any(|c| c.is_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

        let diversity_score =
            u8::from(has_lowercase) + u8::from(has_uppercase) + u8::from(has_digit)
                + u8::from(has_symbol);

        match (base_strength, diversity_score) {
            (PasswordStrength::VeryStrong, 0..=2) => PasswordStrength::Strong,
            (PasswordStrength::Strong, 0..=1) => PasswordStrength::Moderate,
            (PasswordStrength::Moderate, 0..=1) => PasswordStrength::Weak,
            _ => base_strength,
        }
    }
}
