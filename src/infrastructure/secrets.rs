//! Secret generation
//!
//! Random tokens for webhook and admin credentials created during
//! installation.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Generates a random alphanumeric secret of the given length
#[must_use]
pub fn generate_secret(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length() {
        assert_eq!(generate_secret(24).len(), 24);
        assert_eq!(generate_secret(0).len(), 0);
    }

    #[test]
    fn test_generate_secret_is_alphanumeric() {
        let secret = generate_secret(64);
        assert!(secret.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn test_generate_secret_varies() {
        assert_ne!(generate_secret(32), generate_secret(32));
    }
}
