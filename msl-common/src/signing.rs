//! Signed media URL primitives
//!
//! A signed URL grants time-limited read access to one media object. The
//! signature is SHA-256 over `name|expires|secret`, rendered as 64 hex
//! characters. The catalog service issues signatures when handing out
//! stream URLs and verifies them on its media route before touching the
//! filesystem.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Calculate the signature for `name` expiring at `expires` (Unix epoch
/// seconds)
pub fn sign(name: &str, expires: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(expires.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a presented signature against a recomputed one
pub fn verify(name: &str, expires: i64, signature: &str, secret: &str) -> bool {
    let expected = sign(name, expires, secret);
    // Recomputed digest is constant length; compare byte-wise over the
    // full width regardless of early mismatch
    if signature.len() != expected.len() {
        return false;
    }
    signature
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Generate a random signing secret (startup fallback when none is
/// configured)
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_64_hex_chars() {
        let sig = sign("song.mp3", 1_800_000_000, "secret");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_round_trip() {
        let sig = sign("song.mp3", 1_800_000_000, "secret");
        assert!(verify("song.mp3", 1_800_000_000, &sig, "secret"));
    }

    #[test]
    fn tampered_name_rejected() {
        let sig = sign("song.mp3", 1_800_000_000, "secret");
        assert!(!verify("other.mp3", 1_800_000_000, &sig, "secret"));
    }

    #[test]
    fn tampered_expiry_rejected() {
        let sig = sign("song.mp3", 1_800_000_000, "secret");
        assert!(!verify("song.mp3", 1_900_000_000, &sig, "secret"));
    }

    #[test]
    fn wrong_secret_rejected() {
        let sig = sign("song.mp3", 1_800_000_000, "secret");
        assert!(!verify("song.mp3", 1_800_000_000, &sig, "other"));
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(generate_secret(), generate_secret());
        assert_eq!(generate_secret().len(), 48);
    }
}
