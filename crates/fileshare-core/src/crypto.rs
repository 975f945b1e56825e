//! Password hashing, grounded on `hash_password` in the original
//! `common/crypto.c`, shared there between the login and admin-create-user
//! handlers.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of `password`'s raw bytes.
///
/// The server computes this itself from the raw password it receives on
/// the wire; it never accepts a pre-hashed value from a client.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_to_a_64_char_lowercase_hex_digest() {
        let hash = hash_password("admin");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn matches_the_known_sha256_of_admin() {
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
    }

    #[test]
    fn different_passwords_hash_differently() {
        assert_ne!(hash_password("admin"), hash_password("Admin"));
    }
}
