//! Request fingerprints
//!
//! A fingerprint identifies a logical request for both the response cache and
//! the in-flight registry, so two distinct requests sharing one would be
//! answered with each other's payloads. Fields are hashed with explicit length
//! prefixes so that no two field tuples share an encoding, and the 128-bit
//! hash makes an accidental collision negligible.

use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Deterministic 128-bit identity of a logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u128);

impl Fingerprint {
    /// Fingerprint the canonical fields of a request.
    ///
    /// `path` and `base_path` are expected to be normalized already.
    pub fn compute(method: &str, base_path: &str, path: &str, query: &str, body: &[u8]) -> Self {
        let mut hasher = Xxh3::new();
        for field in [method.as_bytes(), base_path.as_bytes(), path.as_bytes(), query.as_bytes(), body] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Self(hasher.digest128())
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deterministic() {
        let a = Fingerprint::compute("GET", "https://api", "users", "page=1", b"");
        let b = Fingerprint::compute("GET", "https://api", "users", "page=1", b"");
        assert_eq!(a, b);
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn test_every_field_contributes() {
        let base = Fingerprint::compute("GET", "https://api", "users", "page=1", b"");
        assert_ne!(base, Fingerprint::compute("POST", "https://api", "users", "page=1", b""));
        assert_ne!(base, Fingerprint::compute("GET", "https://api2", "users", "page=1", b""));
        assert_ne!(base, Fingerprint::compute("GET", "https://api", "user", "page=1", b""));
        assert_ne!(base, Fingerprint::compute("GET", "https://api", "users", "page=2", b""));
        assert_ne!(base, Fingerprint::compute("GET", "https://api", "users", "page=1", b"{}"));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        // Plain concatenation would make these identical
        let a = Fingerprint::compute("GET", "https://api/a", "b", "", b"");
        let b = Fingerprint::compute("GET", "https://api", "/ab", "", b"");
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn proptest_distinct_paths_distinct_fingerprints(
            left in "[a-z/]{0,24}",
            right in "[a-z/]{0,24}"
        ) {
            prop_assume!(left != right);
            let a = Fingerprint::compute("GET", "base", &left, "", b"");
            let b = Fingerprint::compute("GET", "base", &right, "", b"");
            prop_assert_ne!(a, b);
        }
    }
}
