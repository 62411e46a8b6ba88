//! Password hashing, verification and strength rules.
//!
//! Hashes are Argon2id PHC strings. Strength rules reject short, fully
//! numeric, commonly used passwords and those too close to the username.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::collections::HashMap;
use tracing::{debug, error};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Ratio at or above which a password counts as too similar to the username
const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password12", "password123", "passw0rd", "p@ssw0rd", "12345678",
    "123456789", "1234567890", "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess",
    "football", "baseball", "welcome1", "welcome123", "letmein1", "trustno1", "superman",
    "starwars", "whatever", "computer", "michelle", "jennifer", "internet", "mustang1",
    "1q2w3e4r", "1qaz2wsx", "zaq12wsx", "qazwsxedc", "aa123456", "abc12345", "abcd1234",
    "admin123", "administrator", "changeme", "doctor123", "hospital", "medicine", "asdfghjkl",
    "00000000", "11111111", "88888888", "987654321", "qwerty12", "monkey123", "dragon123",
];

/// Error types for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub trait PasswordUtils {
    /// Hashes the given password using Argon2id algorithm
    fn hash_password(password: &str) -> Result<String, PasswordError>;

    /// Verifies the given password against the stored hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Every strength rule the password breaks, empty when it passes
    fn validate_password_strength(password: &str, username: &str) -> Result<(), Vec<String>>;
}

pub struct PasswordUtilsImpl;

impl PasswordUtils for PasswordUtilsImpl {
    fn hash_password(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(OsRng);
        let argon2 = Argon2::default();

        match argon2.hash_password(password.as_bytes(), &salt) {
            Ok(password_hash) => {
                debug!("Password successfully hashed");
                Ok(password_hash.to_string())
            }
            Err(err) => {
                error!("Failed to hash password: {}", err);
                Err(PasswordError::HashingFailed(err.to_string()))
            }
        }
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(hash) => hash,
            Err(err) => {
                error!("Invalid password hash format: {}", err);
                return Err(PasswordError::InvalidHashFormat);
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed - invalid password");
                Ok(false)
            }
            Err(err) => {
                error!("Password verification error: {}", err);
                Err(PasswordError::VerificationFailed(err.to_string()))
            }
        }
    }

    fn validate_password_strength(password: &str, username: &str) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if is_too_similar(password, username) {
            errors.push("The password is too similar to the username.".to_string());
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ));
        }

        let lowered = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            errors.push("This password is too common.".to_string());
        }

        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            errors.push("This password is entirely numeric.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!("Password strength validation failed: {} rule(s)", errors.len());
            Err(errors)
        }
    }
}

/// Compares the password to the whole username and to each of its parts
/// split on non-alphanumeric characters.
fn is_too_similar(password: &str, username: &str) -> bool {
    if username.is_empty() {
        return false;
    }
    let password = password.to_lowercase();
    let username = username.to_lowercase();
    std::iter::once(username.as_str())
        .chain(username.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| !part.is_empty())
        .filter(|part| !exceeds_length_ratio(&password, part))
        .any(|part| similarity(&password, part) >= MAX_SIMILARITY)
}

/// A password ten times longer than `part` cannot reach the threshold.
fn exceeds_length_ratio(password: &str, part: &str) -> bool {
    let password_len = password.chars().count();
    let part_len = part.chars().count();
    let bound = MAX_SIMILARITY / 2.0 * password_len as f64;
    password_len >= 10 * part_len && (part_len as f64) < bound
}

/// `2 * M / T` where M is the number of characters the two strings share,
/// counted with multiplicity, and T the total length. Runs in linear time.
fn similarity(a: &str, b: &str) -> f64 {
    let mut available: HashMap<char, usize> = HashMap::new();
    let mut total = 0;
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
        total += 1;
    }
    let mut matches = 0;
    for c in a.chars() {
        total += 1;
        if let Some(n) = available.get_mut(&c).filter(|n| **n > 0) {
            *n -= 1;
            matches += 1;
        }
    }
    if total == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / total as f64
}
