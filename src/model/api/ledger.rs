use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::{
    api::candidate::CandidateDesc,
    common::candidate::{CandidateId, CandidateStatus},
    ledger::{reconcile_tallies, verify_chain, ChainVerdict, LedgerEntry},
};

/// A complete, consistent copy of the ledger and the counts it should produce.
/// This is what gets published for offline audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDump {
    pub entries: Vec<LedgerEntry>,
    pub candidates: Vec<CandidateDesc>,
}

/// Why a ledger dump failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// The hash chain diverges at this sequence number.
    Chain { sequence_no: u64 },
    /// This candidate's recorded count disagrees with the ledger.
    Tally { candidate_id: CandidateId },
}

impl Display for VerificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chain { sequence_no } => {
                write!(f, "the hash chain is broken at entry {sequence_no}")
            }
            Self::Tally { candidate_id } => write!(
                f,
                "the vote count for candidate {candidate_id} does not match the ledger"
            ),
        }
    }
}

impl LedgerDump {
    /// Check the chain, then check every count against it.
    pub fn verify(&self) -> Result<(), VerificationError> {
        if let ChainVerdict::BrokenAt(sequence_no) = verify_chain(&self.entries) {
            return Err(VerificationError::Chain { sequence_no });
        }
        let tallies = self.candidates.iter().map(|c| (c.id, c.vote_count));
        match reconcile_tallies(&self.entries, tallies) {
            Some(candidate_id) => Err(VerificationError::Tally { candidate_id }),
            None => Ok(()),
        }
    }

    /// Summarise [`verify`](Self::verify) as a position in the chain.
    ///
    /// Counts are only known to be wrong as of the current tail, so a tally
    /// mismatch is reported there. An empty ledger with counted votes is
    /// missing its entries from the first position on, so it is broken at 1.
    pub fn verdict(&self) -> ChainVerdict {
        match self.verify() {
            Ok(()) => ChainVerdict::Valid,
            Err(VerificationError::Chain { sequence_no }) => ChainVerdict::BrokenAt(sequence_no),
            Err(VerificationError::Tally { candidate_id }) => {
                warn!("Vote count for candidate {candidate_id} disagrees with the ledger");
                let tail = self.entries.last().map_or(1, |e| e.sequence_no);
                ChainVerdict::BrokenAt(tail)
            }
        }
    }

    /// Approved candidates ordered by votes, most first; ties by ID.
    pub fn standings(&self) -> Vec<CandidateDesc> {
        let mut standings: Vec<CandidateDesc> = self
            .candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Approved)
            .cloned()
            .collect();
        standings.sort_by(|a, b| b.vote_count.cmp(&a.vote_count).then(a.id.cmp(&b.id)));
        standings
    }
}
