//! Single-use secret generation.

use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::SecretString;

/// Generates a fresh high-entropy alphanumeric secret of exactly `length` characters.
///
/// Drawn from the thread-local CSPRNG; every call is independent.
pub fn generate_secret(length: usize) -> SecretString {
    let value: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    SecretString::new(value)
}
