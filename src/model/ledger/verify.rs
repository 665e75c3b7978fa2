use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::common::candidate::CandidateId;

use super::{entry::LedgerEntry, hash::ChainHash};

/// Outcome of checking the ledger's integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "at", rename_all = "snake_case")]
pub enum ChainVerdict {
    Valid,
    /// The first sequence number at which the stored ledger diverges from a
    /// correctly built chain. Always a position in the chain, starting at 1.
    BrokenAt(u64),
}

impl ChainVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Walk the chain from genesis, recomputing every hash.
///
/// `entries` must be in storage order (ascending `sequence_no`). An entry is
/// broken if its sequence number is not the next one expected, its `prev_hash`
/// is not its predecessor's `entry_hash`, or its `entry_hash` does not
/// recompute from its own fields. The expected sequence number is reported, so
/// a deleted entry is reported at the position it used to occupy.
pub fn verify_chain(entries: &[LedgerEntry]) -> ChainVerdict {
    let mut prev = ChainHash::genesis();
    for (expected, entry) in (1u64..).zip(entries) {
        if entry.sequence_no != expected
            || entry.prev_hash != prev
            || entry.recompute_hash() != entry.entry_hash
        {
            return ChainVerdict::BrokenAt(expected);
        }
        prev = entry.entry_hash.clone();
    }
    ChainVerdict::Valid
}

/// Compare recorded vote counts against the ledger.
///
/// Returns the first candidate whose count disagrees with the number of ledger
/// entries naming it, including entries naming candidates that don't exist.
pub fn reconcile_tallies<I>(entries: &[LedgerEntry], tallies: I) -> Option<CandidateId>
where
    I: IntoIterator<Item = (CandidateId, u64)>,
{
    let mut counted: HashMap<CandidateId, u64> = HashMap::new();
    for entry in entries {
        *counted.entry(entry.candidate_id).or_default() += 1;
    }

    for (candidate_id, vote_count) in tallies {
        if counted.remove(&candidate_id).unwrap_or(0) != vote_count {
            return Some(candidate_id);
        }
    }

    // Anything left over was voted for but has no record at all.
    counted.into_keys().min()
}
