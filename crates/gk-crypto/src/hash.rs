//! Hash functions and constant-time comparison.

use aws_lc_rs::{constant_time, digest, hmac};

/// Computes a SHA-256 hash of the input data.
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}

/// Computes a SHA-256 hash and returns it as a lowercase hex string.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    sha256(data).iter().map(|b| format!("{b:02x}")).collect()
}

/// Computes an HMAC-SHA256 tag over the input data.
#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Compares two byte slices in constant time.
///
/// Returns `false` when the lengths differ.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    constant_time::verify_slices_are_equal(a, b).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_produces_correct_length() {
        let result = sha256(b"test");
        assert_eq!(result.len(), 32);
    }

    #[test]
    fn sha256_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_is_deterministic() {
        assert_eq!(sha256(b"hello world"), sha256(b"hello world"));
    }

    #[test]
    fn different_inputs_produce_different_hashes() {
        assert_ne!(sha256(b"hello"), sha256(b"world"));
    }

    #[test]
    fn hmac_sha256_depends_on_key() {
        let a = hmac_sha256(b"key1", b"data");
        let b = hmac_sha256(b"key2", b"data");
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn constant_time_eq_matches() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secres"));
        assert!(!constant_time_eq(b"secret", b"longer-secret"));
    }
}
