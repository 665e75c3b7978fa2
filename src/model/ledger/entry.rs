use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::candidate::CandidateId;

use super::hash::ChainHash;

/// Format of ledger timestamps. Part of the hash input, so it must never change
/// for an existing ledger.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a point in time as a ledger timestamp.
pub fn ledger_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One recorded vote. Entries are immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the chain, starting from 1 with no gaps.
    pub sequence_no: u64,
    pub voter_id: String,
    pub candidate_id: CandidateId,
    pub entry_hash: ChainHash,
    pub prev_hash: ChainHash,
    pub timestamp: String,
}

impl LedgerEntry {
    /// Build the entry that follows `tail`, or the first entry if the chain is empty.
    pub fn append_after(
        tail: Option<&LedgerEntry>,
        voter_id: &str,
        candidate_id: CandidateId,
        timestamp: String,
    ) -> Self {
        let (sequence_no, prev_hash) = match tail {
            Some(tail) => (tail.sequence_no + 1, tail.entry_hash.clone()),
            None => (1, ChainHash::genesis()),
        };
        let entry_hash = ChainHash::link(&prev_hash, voter_id, &timestamp);
        Self {
            sequence_no,
            voter_id: voter_id.to_string(),
            candidate_id,
            entry_hash,
            prev_hash,
            timestamp,
        }
    }

    /// Recompute this entry's hash from its stored fields.
    pub fn recompute_hash(&self) -> ChainHash {
        ChainHash::link(&self.prev_hash, &self.voter_id, &self.timestamp)
    }
}
