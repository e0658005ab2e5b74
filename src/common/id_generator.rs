// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., R_K7NP3X for registrations)
//!
//! The alphabet excludes I, L, O and U so ids can be read aloud without ambiguity.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ID_LENGTH: usize = 6;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Registration (R_)
    Registration,
    /// Request (Q_) - correlates log lines of one HTTP request
    Request,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Registration => "R",
            EntityPrefix::Request => "Q",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID in format "PREFIX_XXXXXX"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

/// Generate a Registration ID (R_XXXXXX)
pub fn generate_registration_id() -> String {
    generate_id(EntityPrefix::Registration)
}

/// Generate a Request ID (Q_XXXXXX)
pub fn generate_request_id() -> String {
    generate_id(EntityPrefix::Request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let id = generate_registration_id();
        assert!(id.starts_with("R_"));
        assert_eq!(id.len(), 8); // "R_" + 6 chars

        assert!(generate_request_id().starts_with("Q_"));
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_registration_id();
        for c in id[2..].chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            assert!(ids.insert(generate_registration_id()), "Duplicate ID generated");
        }
    }
}
