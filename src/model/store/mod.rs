//! Persistence for candidates, voters and the ledger.

use crate::error::Result;
use crate::model::{
    common::candidate::{CandidateId, CandidateStatus},
    db::{
        candidate::{Candidate, NewCandidate},
        voter::Voter,
    },
    gate::Admitted,
    ledger::LedgerEntry,
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A durable home for the election's three tables.
///
/// Implementations need not serialise ledger appends themselves; the
/// [`Election`](crate::election::Election) holds a single write lock
/// around every tail read and commit. They must however make
/// [`commit_vote`](ElectionStore::commit_vote) all-or-nothing.
#[rocket::async_trait]
pub trait ElectionStore: Send + Sync {
    /// Insert a candidate, assigning the next free ID.
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>>;

    /// All candidates, optionally only those with the given status, ordered by ID.
    async fn candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>>;

    /// Move a pending candidate to `status`.
    /// Returns `None` if the candidate doesn't exist or is no longer pending.
    async fn decide_candidate(
        &self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>>;

    /// Get the voter with the given ID, creating them if this is first contact.
    async fn ensure_voter(&self, voter_id: &str) -> Result<Voter>;

    async fn voter(&self, voter_id: &str) -> Result<Option<Voter>>;

    /// The most recent ledger entry, if any.
    async fn ledger_tail(&self) -> Result<Option<LedgerEntry>>;

    /// Every ledger entry, in ascending sequence order.
    async fn ledger(&self) -> Result<Vec<LedgerEntry>>;

    /// Atomically pass the voter through the eligibility gate, append `entry`,
    /// and credit the vote to its candidate.
    ///
    /// Fails with `AlreadyVoted` or `InvalidCandidate` (in that order of
    /// precedence) without changing anything.
    async fn commit_vote(&self, entry: &LedgerEntry) -> Result<Admitted>;
}
