//! Commit–reveal seeding for auditable combat rolls.
//!
//! The host commits to a server seed by publishing its SHA-256 digest before a
//! session starts. After the session the seed is revealed; anyone can check it
//! against the commitment and re-derive the exact generator from
//! `(server_seed, client_seed, nonce)`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::rng::RandomSource;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairSeed {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl FairSeed {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    /// Hex digest of the server seed, published before play.
    pub fn commitment(&self) -> String {
        commit(&self.server_seed)
    }

    /// Checks a revealed seed against an earlier commitment.
    pub fn verify(&self, commitment: &str) -> bool {
        self.commitment().eq_ignore_ascii_case(commitment)
    }

    pub fn seed_bytes(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.server_seed.as_bytes());
        hasher.update(b":");
        hasher.update(self.client_seed.as_bytes());
        hasher.update(b":");
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }

    pub fn rng(&self) -> RandomSource<ChaCha8Rng> {
        RandomSource::from_seed_bytes(self.seed_bytes())
    }
}

pub fn commit(server_seed: &str) -> String {
    Sha256::digest(server_seed.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::CombatRng;

    #[test]
    fn test_commitment_is_sha256_hex() {
        let seed = FairSeed::new("server", "client", 0);
        let commitment = seed.commitment();
        assert_eq!(commitment.len(), 64);
        assert!(seed.verify(&commitment));
        assert!(seed.verify(&commitment.to_uppercase()));
        assert!(!FairSeed::new("other", "client", 0).verify(&commitment));
    }

    #[test]
    fn test_same_inputs_same_rolls() {
        let mut a = FairSeed::new("s", "c", 3).rng();
        let mut b = FairSeed::new("s", "c", 3).rng();
        for _ in 0..10 {
            assert_eq!(a.roll_percent(), b.roll_percent());
        }
    }

    #[test]
    fn test_nonce_changes_seed() {
        let a = FairSeed::new("s", "c", 1).seed_bytes();
        let b = FairSeed::new("s", "c", 2).seed_bytes();
        assert_ne!(a, b);
    }
}
