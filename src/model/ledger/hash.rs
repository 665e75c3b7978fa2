use std::fmt::{Display, Formatter};

use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// A link in the ledger chain: a hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainHash(String);

impl ChainHash {
    /// The placeholder `prev_hash` of the first ledger entry: 64 zeroes.
    pub fn genesis() -> Self {
        Self("0".repeat(HASH_HEX_LEN))
    }

    /// Compute the hash of an entry following `prev`.
    ///
    /// The digest input is `prev ‖ voter_id ‖ timestamp`, in exactly that order.
    pub fn link(prev: &ChainHash, voter_id: &str, timestamp: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prev.0.as_bytes());
        hasher.update(voter_id.as_bytes());
        hasher.update(timestamp.as_bytes());
        Self(HEXLOWER.encode(&hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChainHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChainHash {
    fn from(hex: String) -> Self {
        Self(hex)
    }
}
