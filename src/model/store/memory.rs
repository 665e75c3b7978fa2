use std::collections::BTreeMap;
use std::collections::HashMap;

use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{
    common::candidate::{CandidateId, CandidateStatus},
    db::{
        candidate::{Candidate, NewCandidate},
        voter::Voter,
    },
    gate::Admitted,
    ledger::{ChainHash, LedgerEntry},
};

use super::ElectionStore;

#[derive(Debug, Default)]
struct Tables {
    next_candidate_id: CandidateId,
    candidates: BTreeMap<CandidateId, Candidate>,
    voters: HashMap<String, Voter>,
    ledger: Vec<LedgerEntry>,
}

/// A non-durable store for development and tests. Everything is lost on shutdown.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_candidate_id: 1,
                ..Default::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl ElectionStore for MemoryStore {
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_candidate_id;
        tables.next_candidate_id += 1;
        let candidate = Candidate::new(id, candidate);
        tables.candidates.insert(id, candidate.clone());
        Ok(candidate)
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.tables.lock().await.candidates.get(&id).cloned())
    }

    async fn candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .candidates
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    async fn decide_candidate(
        &self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.candidates.get_mut(&id) {
            Some(candidate) if candidate.status.can_become(status) => {
                candidate.status = status;
                Some(candidate.clone())
            }
            _ => None,
        })
    }

    async fn ensure_voter(&self, voter_id: &str) -> Result<Voter> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .voters
            .entry(voter_id.to_string())
            .or_insert_with(|| Voter::new(voter_id))
            .clone())
    }

    async fn voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        Ok(self.tables.lock().await.voters.get(voter_id).cloned())
    }

    async fn ledger_tail(&self) -> Result<Option<LedgerEntry>> {
        Ok(self.tables.lock().await.ledger.last().cloned())
    }

    async fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.tables.lock().await.ledger.clone())
    }

    async fn commit_vote(&self, entry: &LedgerEntry) -> Result<Admitted> {
        let mut tables = self.tables.lock().await;

        // Work on copies, and only write back once every step has succeeded.
        let mut voter = tables
            .voters
            .get(&entry.voter_id)
            .cloned()
            .unwrap_or_else(|| Voter::new(&entry.voter_id));
        let admitted = voter.check_and_reserve()?;

        let mut candidate = tables
            .candidates
            .get(&entry.candidate_id)
            .cloned()
            .ok_or(Error::InvalidCandidate(entry.candidate_id))?;
        candidate.credit_vote(entry.candidate_id)?;

        let (next_sequence_no, tail_hash) = match tables.ledger.last() {
            Some(tail) => (tail.sequence_no + 1, tail.entry_hash.clone()),
            None => (1, ChainHash::genesis()),
        };
        if entry.sequence_no != next_sequence_no || entry.prev_hash != tail_hash {
            return Err(Error::Persistence(format!(
                "ledger entry {} would not follow entry {}",
                entry.sequence_no,
                next_sequence_no - 1
            )));
        }

        tables.voters.insert(voter.voter_id.clone(), voter);
        tables.candidates.insert(candidate.id, candidate);
        tables.ledger.push(entry.clone());
        Ok(admitted)
    }
}

/// Direct table access for simulating tampering in tests.
#[cfg(test)]
impl MemoryStore {
    pub async fn tamper_entry(&self, sequence_no: u64, tamper: impl FnOnce(&mut LedgerEntry)) {
        let mut tables = self.tables.lock().await;
        let entry = tables
            .ledger
            .iter_mut()
            .find(|e| e.sequence_no == sequence_no)
            .expect("no such entry");
        tamper(entry);
    }

    pub async fn tamper_candidate(&self, id: CandidateId, tamper: impl FnOnce(&mut Candidate)) {
        let mut tables = self.tables.lock().await;
        tamper(tables.candidates.get_mut(&id).expect("no such candidate"));
    }
}
