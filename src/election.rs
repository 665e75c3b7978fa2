//! The election instance: candidates, the eligibility gate and the vote ledger,
//! composed behind a single write lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{
    api::{
        candidate::{CandidateDesc, CandidateSpec},
        ledger::LedgerDump,
    },
    common::{
        candidate::{CandidateId, CandidateStatus},
        clock::Clock,
        phase::{Phase, Timeline},
    },
    db::{
        candidate::{Candidate, NewCandidate},
        voter::Voter,
    },
    ledger::{ledger_timestamp, ChainVerdict, LedgerEntry},
    store::ElectionStore,
};

/// Everything one election needs, built at launch and torn down with the server.
pub struct Election {
    store: Arc<dyn ElectionStore>,
    clock: Arc<dyn Clock>,
    timeline: Timeline,
    /// Serialises every ledger append, and gives verification a consistent view.
    write_lock: Mutex<()>,
}

impl Election {
    pub fn new(store: Arc<dyn ElectionStore>, clock: Arc<dyn Clock>, timeline: Timeline) -> Self {
        Self {
            store,
            clock,
            timeline,
            write_lock: Mutex::new(()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The current phase of the election.
    pub fn phase(&self) -> Phase {
        Phase::at(self.now(), &self.timeline)
    }

    /// Register a new, pending candidate.
    pub async fn register_candidate(&self, spec: CandidateSpec) -> Result<Candidate> {
        spec.validate().map_err(Error::bad_request)?;
        let candidate = self.store.insert_candidate(NewCandidate::new(spec)).await?;
        info!("Registered candidate {} ({})", candidate.id, candidate.name);
        Ok(candidate)
    }

    /// Approve or reject a pending candidate. Decisions are final.
    pub async fn set_candidate_status(
        &self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<Candidate> {
        if status == CandidateStatus::Pending {
            return Err(Error::bad_request("a candidate cannot be returned to pending"));
        }
        match self.store.decide_candidate(id, status).await? {
            Some(candidate) => {
                info!("Candidate {id} is now {status:?}");
                Ok(candidate)
            }
            None => match self.store.candidate(id).await? {
                Some(candidate) => Err(Error::Status(
                    rocket::http::Status::Conflict,
                    format!(
                        "Candidate {id} has already been decided: {:?}",
                        candidate.status
                    ),
                )),
                None => Err(Error::not_found(format!("Candidate {id}"))),
            },
        }
    }

    /// Candidates, optionally only those with the given status, ordered by ID.
    pub async fn list_candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>> {
        self.store.candidates(status).await
    }

    /// Record first contact with a voter, returning their record.
    pub async fn admit_voter(&self, voter_id: &str) -> Result<Voter> {
        self.store.ensure_voter(voter_id).await
    }

    pub async fn voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        self.store.voter(voter_id).await
    }

    /// Cast `voter_id`'s one and only vote, for `candidate_id`.
    ///
    /// The eligibility check, the ledger append and the candidate's count all
    /// land together or not at all. A voter seen here for the first time is
    /// only recorded if their vote goes through.
    pub async fn cast_vote(&self, voter_id: &str, candidate_id: CandidateId) -> Result<LedgerEntry> {
        let _guard = self.write_lock.lock().await;
        let tail = self.store.ledger_tail().await?;
        let timestamp = ledger_timestamp(self.now());
        let entry = LedgerEntry::append_after(tail.as_ref(), voter_id, candidate_id, timestamp);

        match self.store.commit_vote(&entry).await {
            Ok(_) => {
                info!(
                    "Recorded vote #{} for candidate {candidate_id}",
                    entry.sequence_no
                );
                Ok(entry)
            }
            Err(err) => {
                warn!("Rejected vote by {voter_id}: {err}");
                Err(err)
            }
        }
    }

    /// Take a consistent copy of the ledger and every candidate.
    pub async fn dump(&self) -> Result<LedgerDump> {
        let _guard = self.write_lock.lock().await;
        let entries = self.store.ledger().await?;
        let candidates = self.store.candidates(None).await?;
        Ok(LedgerDump {
            entries,
            candidates: candidates.into_iter().map(Into::into).collect(),
        })
    }

    /// Check the ledger chain, and that every candidate's count matches it.
    pub async fn verify_ledger(&self) -> Result<ChainVerdict> {
        let verdict = self.dump().await?.verdict();
        if let ChainVerdict::BrokenAt(at) = verdict {
            error!("Ledger integrity check failed at entry {at}");
        }
        Ok(verdict)
    }

    /// Approved candidates ordered by votes, most first; ties by ID.
    ///
    /// Refuses to publish anything if the ledger does not verify.
    pub async fn results(&self) -> Result<Vec<CandidateDesc>> {
        let dump = self.dump().await?;
        if let ChainVerdict::BrokenAt(at) = dump.verdict() {
            error!("Withholding results: ledger integrity check failed at entry {at}");
            return Err(Error::ChainBroken(at));
        }
        Ok(dump.standings())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use rocket::futures::future::join_all;
    use rocket::tokio;

    use super::*;
    use crate::model::{
        common::clock::ManualClock,
        ledger::{verify_chain, ChainHash},
        store::MemoryStore,
    };

    struct Fixture {
        election: Arc<Election>,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Timeline::example_time_in(
            Phase::VotingOpen,
        )));
        let election = Arc::new(Election::new(
            store.clone(),
            clock.clone(),
            Timeline::example(),
        ));
        Fixture {
            election,
            store,
            clock,
        }
    }

    /// Register `n` candidates and approve them all.
    async fn approved_candidates(election: &Election, n: usize) -> Vec<CandidateId> {
        let mut ids = Vec::with_capacity(n);
        for _ in 0..n {
            let candidate = election
                .register_candidate(CandidateSpec::example())
                .await
                .unwrap();
            election
                .set_candidate_status(candidate.id, CandidateStatus::Approved)
                .await
                .unwrap();
            ids.push(candidate.id);
        }
        ids
    }

    #[rocket::async_test]
    async fn registration_creates_pending_candidates() {
        let Fixture { election, .. } = fixture();
        let candidate = election
            .register_candidate(CandidateSpec::example())
            .await
            .unwrap();
        assert_eq!(candidate.id, 1);
        assert_eq!(candidate.status, CandidateStatus::Pending);
        assert_eq!(
            election
                .list_candidates(Some(CandidateStatus::Pending))
                .await
                .unwrap(),
            vec![candidate]
        );
    }

    #[rocket::async_test]
    async fn invalid_registration_is_rejected() {
        let Fixture { election, .. } = fixture();
        let mut spec = CandidateSpec::example();
        spec.name = "  ".to_string();
        assert!(election.register_candidate(spec).await.is_err());
        assert!(election.list_candidates(None).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn decisions_are_one_way() {
        let Fixture { election, .. } = fixture();
        let id = approved_candidates(&election, 1).await[0];

        let err = election
            .set_candidate_status(id, CandidateStatus::Rejected)
            .await
            .unwrap_err();
        assert_eq!(err.status(), rocket::http::Status::Conflict);

        let err = election
            .set_candidate_status(id, CandidateStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.status(), rocket::http::Status::BadRequest);

        let err = election
            .set_candidate_status(42, CandidateStatus::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.status(), rocket::http::Status::NotFound);
    }

    #[rocket::async_test]
    async fn votes_are_chained() {
        let Fixture {
            election, clock, ..
        } = fixture();
        let ids = approved_candidates(&election, 2).await;

        clock.set(Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap());
        let first = election.cast_vote("A", ids[0]).await.unwrap();
        clock.set(Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 5).unwrap());
        let second = election.cast_vote("B", ids[1]).await.unwrap();

        assert_eq!(first.sequence_no, 1);
        assert_eq!(first.timestamp, "2026-01-20 10:00:00");
        assert_eq!(first.prev_hash, ChainHash::genesis());
        assert_eq!(
            first.entry_hash,
            ChainHash::link(&ChainHash::genesis(), "A", "2026-01-20 10:00:00")
        );
        assert_eq!(second.sequence_no, 2);
        assert_eq!(second.prev_hash, first.entry_hash);
        assert_eq!(
            second.entry_hash,
            ChainHash::link(&first.entry_hash, "B", "2026-01-20 10:00:05")
        );
        assert_eq!(election.verify_ledger().await.unwrap(), ChainVerdict::Valid);
    }

    #[rocket::async_test]
    async fn repeat_votes_are_rejected() {
        let Fixture { election, .. } = fixture();
        let ids = approved_candidates(&election, 2).await;

        election.cast_vote("123456", ids[0]).await.unwrap();
        for candidate in &ids {
            assert!(matches!(
                election.cast_vote("123456", *candidate).await,
                Err(Error::AlreadyVoted(_))
            ));
        }

        let dump = election.dump().await.unwrap();
        assert_eq!(dump.entries.len(), 1);
        assert_eq!(dump.candidates[0].vote_count, 1);
        assert_eq!(dump.candidates[1].vote_count, 0);
        assert!(election.voter("123456").await.unwrap().unwrap().has_voted);
    }

    #[rocket::async_test]
    async fn votes_for_unapproved_candidates_change_nothing() {
        let Fixture { election, .. } = fixture();
        let pending = election
            .register_candidate(CandidateSpec::example())
            .await
            .unwrap();
        let rejected = election
            .register_candidate(CandidateSpec::example())
            .await
            .unwrap();
        election
            .set_candidate_status(rejected.id, CandidateStatus::Rejected)
            .await
            .unwrap();

        for candidate in [pending.id, rejected.id, 99] {
            assert!(matches!(
                election.cast_vote("123456", candidate).await,
                Err(Error::InvalidCandidate(id)) if id == candidate
            ));
        }

        // No trace of the failed attempts, not even a voter record.
        assert_eq!(election.voter("123456").await.unwrap(), None);
        assert!(election.dump().await.unwrap().entries.is_empty());

        // The voter may still vote once a valid choice is made.
        let approved = approved_candidates(&election, 1).await[0];
        election.cast_vote("123456", approved).await.unwrap();
        assert!(election.voter("123456").await.unwrap().unwrap().has_voted);
    }

    #[rocket::async_test]
    async fn concurrent_distinct_voters_fill_the_sequence() {
        const VOTERS: usize = 50;
        let Fixture { election, .. } = fixture();
        let ids = approved_candidates(&election, 3).await;

        let tasks = (0..VOTERS).map(|i| {
            let election = election.clone();
            let candidate = ids[i % ids.len()];
            tokio::spawn(async move { election.cast_vote(&format!("{i:06}"), candidate).await })
        });
        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let dump = election.dump().await.unwrap();
        let sequence: Vec<u64> = dump.entries.iter().map(|e| e.sequence_no).collect();
        assert_eq!(sequence, (1..=VOTERS as u64).collect::<Vec<_>>());
        let voters: HashSet<&str> = dump.entries.iter().map(|e| e.voter_id.as_str()).collect();
        assert_eq!(voters.len(), VOTERS);
        assert_eq!(verify_chain(&dump.entries), ChainVerdict::Valid);
        assert_eq!(dump.verdict(), ChainVerdict::Valid);
    }

    #[rocket::async_test]
    async fn concurrent_repeat_voter_is_admitted_once() {
        let Fixture { election, .. } = fixture();
        let ids = approved_candidates(&election, 2).await;

        let attempts = ids.iter().map(|candidate| {
            let election = election.clone();
            let candidate = *candidate;
            tokio::spawn(async move { election.cast_vote("123456", candidate).await })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(Error::AlreadyVoted(_))))
                .count(),
            1
        );
        assert_eq!(election.dump().await.unwrap().entries.len(), 1);
    }

    #[rocket::async_test]
    async fn results_are_ranked() {
        let Fixture { election, .. } = fixture();
        let ids = approved_candidates(&election, 3).await;
        let rejected = election
            .register_candidate(CandidateSpec::example())
            .await
            .unwrap();
        election
            .set_candidate_status(rejected.id, CandidateStatus::Rejected)
            .await
            .unwrap();

        // Candidate 3 gets two votes, 1 gets one, 2 gets none.
        election.cast_vote("000001", ids[2]).await.unwrap();
        election.cast_vote("000002", ids[0]).await.unwrap();
        election.cast_vote("000003", ids[2]).await.unwrap();

        let standings: Vec<(CandidateId, u64)> = election
            .results()
            .await
            .unwrap()
            .iter()
            .map(|c| (c.id, c.vote_count))
            .collect();
        assert_eq!(standings, vec![(ids[2], 2), (ids[0], 1), (ids[1], 0)]);
    }

    #[rocket::async_test]
    async fn tampering_blocks_results() {
        let Fixture {
            election, store, ..
        } = fixture();
        let ids = approved_candidates(&election, 2).await;
        for (i, voter) in ["000001", "000002", "000003"].iter().enumerate() {
            election.cast_vote(voter, ids[i % 2]).await.unwrap();
        }
        assert_eq!(election.verify_ledger().await.unwrap(), ChainVerdict::Valid);

        store
            .tamper_entry(2, |entry| entry.voter_id = "999999".to_string())
            .await;
        assert_eq!(
            election.verify_ledger().await.unwrap(),
            ChainVerdict::BrokenAt(2)
        );
        assert!(matches!(
            election.results().await,
            Err(Error::ChainBroken(2))
        ));
    }

    #[rocket::async_test]
    async fn retargeted_vote_is_detected() {
        let Fixture {
            election, store, ..
        } = fixture();
        let ids = approved_candidates(&election, 2).await;
        election.cast_vote("000001", ids[0]).await.unwrap();
        election.cast_vote("000002", ids[0]).await.unwrap();

        store
            .tamper_entry(1, |entry| entry.candidate_id = ids[1])
            .await;
        assert_eq!(
            election.verify_ledger().await.unwrap(),
            ChainVerdict::BrokenAt(2)
        );
    }

    #[rocket::async_test]
    async fn inflated_count_is_detected() {
        let Fixture {
            election, store, ..
        } = fixture();
        let ids = approved_candidates(&election, 2).await;
        election.cast_vote("000001", ids[0]).await.unwrap();

        store
            .tamper_candidate(ids[1], |candidate| candidate.vote_count = 10)
            .await;
        assert_eq!(
            election.verify_ledger().await.unwrap(),
            ChainVerdict::BrokenAt(1)
        );
        assert!(election.results().await.is_err());
    }

    #[rocket::async_test]
    async fn phase_follows_the_clock() {
        let Fixture {
            election, clock, ..
        } = fixture();
        assert_eq!(election.phase(), Phase::VotingOpen);
        clock.set(Timeline::example_time_in(Phase::Results));
        assert_eq!(election.phase(), Phase::Results);
    }
}
