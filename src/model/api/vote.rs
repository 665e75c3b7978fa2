use serde::{Deserialize, Serialize};

use crate::model::{
    common::candidate::CandidateId,
    ledger::{ChainHash, LedgerEntry},
};

/// A voter's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
}

/// Proof of a recorded vote: the voter can later find this entry in the
/// published ledger and check it is still chained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub sequence_no: u64,
    pub entry_hash: ChainHash,
    pub timestamp: String,
}

impl From<LedgerEntry> for VoteReceipt {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            sequence_no: entry.sequence_no,
            entry_hash: entry.entry_hash,
            timestamp: entry.timestamp,
        }
    }
}
