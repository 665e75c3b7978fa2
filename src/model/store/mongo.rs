use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneOptions, FindOptions, UpdateOptions},
    Client, ClientSession, Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    common::candidate::{CandidateId, CandidateStatus},
    db::{
        candidate::{Candidate, NewCandidate},
        voter::Voter,
    },
    gate::{reserve_filter, reserve_update, Admitted},
    ledger::LedgerEntry,
    mongodb::{
        ensure_candidate_id_counter_exists, ensure_indexes_exist, is_duplicate_key_error, Coll,
        Counter, CANDIDATE_ID_COUNTER_ID,
    },
};

use super::ElectionStore;

/// The durable store. Vote commits run as multi-document transactions, so the
/// server must be a replica set member.
pub struct MongoStore {
    client: Client,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
    voters: Coll<Voter>,
    ledger: Coll<LedgerEntry>,
    counters: Coll<Counter>,
}

impl MongoStore {
    /// Connect to the given database, performing any setup necessary.
    pub async fn connect(client: Client, db: &Database) -> std::result::Result<Self, DbError> {
        ensure_indexes_exist(db).await?;
        let counters = Coll::from_db(db);
        ensure_candidate_id_counter_exists(&counters).await?;

        Ok(Self {
            client,
            candidates: Coll::from_db(db),
            new_candidates: Coll::from_db(db),
            voters: Coll::from_db(db),
            ledger: Coll::from_db(db),
            counters,
        })
    }

    /// The body of [`ElectionStore::commit_vote`], run inside `session`'s transaction.
    async fn commit_vote_in(
        &self,
        entry: &LedgerEntry,
        session: &mut ClientSession,
    ) -> Result<Admitted> {
        // Eligibility gate: a single conditional write, so it cannot race.
        // A voter with no record yet is created already flagged; a flagged one
        // fails the filter and the upsert then collides on the unique voter ID.
        let options = UpdateOptions::builder().upsert(true).build();
        let reserved = match self
            .voters
            .update_one_with_session(
                reserve_filter(&entry.voter_id),
                reserve_update(),
                options,
                session,
            )
            .await
        {
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::AlreadyVoted(entry.voter_id.clone()))
            }
            result => result?,
        };
        if reserved.matched_count != 1 && reserved.upserted_id.is_none() {
            return Err(Error::AlreadyVoted(entry.voter_id.clone()));
        }

        // Credit the candidate, but only if they are on the ballot.
        let filter = doc! {
            "_id": entry.candidate_id,
            "status": CandidateStatus::Approved,
        };
        let update = doc! {
            "$inc": { "vote_count": 1 }
        };
        let credited = self
            .candidates
            .update_one_with_session(filter, update, None, session)
            .await?;
        if credited.matched_count != 1 {
            return Err(Error::InvalidCandidate(entry.candidate_id));
        }

        // Append. The unique indexes refuse a forked or repeated entry.
        match self
            .ledger
            .insert_one_with_session(entry, None, session)
            .await
        {
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::Persistence(format!(
                    "ledger entry {} collides with an existing entry",
                    entry.sequence_no
                )))
            }
            result => {
                result?;
            }
        }

        Ok(Admitted {
            voter_id: entry.voter_id.clone(),
        })
    }
}

#[rocket::async_trait]
impl ElectionStore for MongoStore {
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let id = Counter::next(&self.counters, CANDIDATE_ID_COUNTER_ID).await?;
        let candidate = Candidate::new(id, candidate);
        self.candidates.insert_one(&candidate, None).await?;
        Ok(candidate)
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.candidates.find_one(doc! { "_id": id }, None).await?)
    }

    async fn candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>> {
        let filter = status.map(|status| doc! { "status": status });
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        Ok(self
            .candidates
            .find(filter, options)
            .await?
            .try_collect::<Vec<_>>()
            .await?)
    }

    async fn decide_candidate(
        &self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>> {
        if !CandidateStatus::Pending.can_become(status) {
            return Ok(None);
        }
        let filter = doc! {
            "_id": id,
            "status": CandidateStatus::Pending,
        };
        let update = doc! {
            "$set": { "status": status }
        };
        let result = self.new_candidates.update_one(filter, update, None).await?;
        if result.modified_count != 1 {
            return Ok(None);
        }
        self.candidate(id).await
    }

    async fn ensure_voter(&self, voter_id: &str) -> Result<Voter> {
        let filter = doc! { "voter_id": voter_id };
        let update = doc! {
            "$setOnInsert": { "voter_id": voter_id, "has_voted": false }
        };
        let options = UpdateOptions::builder().upsert(true).build();
        match self.voters.update_one(filter, update, options).await {
            // A concurrent first contact won the race; their record is just as good.
            Err(e) if is_duplicate_key_error(&e) => {}
            result => {
                result?;
            }
        }
        self.voter(voter_id)
            .await?
            .ok_or_else(|| Error::Persistence(format!("voter {voter_id} vanished after upsert")))
    }

    async fn voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        Ok(self
            .voters
            .find_one(doc! { "voter_id": voter_id }, None)
            .await?)
    }

    async fn ledger_tail(&self) -> Result<Option<LedgerEntry>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "sequence_no": -1 })
            .build();
        Ok(self.ledger.find_one(None, options).await?)
    }

    async fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let options = FindOptions::builder()
            .sort(doc! { "sequence_no": 1 })
            .build();
        Ok(self.ledger.find(None, options).await?.try_collect::<Vec<_>>().await?)
    }

    async fn commit_vote(&self, entry: &LedgerEntry) -> Result<Admitted> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        match self.commit_vote_in(entry, &mut session).await {
            Ok(admitted) => {
                session.commit_transaction().await?;
                Ok(admitted)
            }
            Err(e) => {
                if let Err(abort) = session.abort_transaction().await {
                    error!("Failed to abort vote transaction: {abort}");
                }
                Err(e)
            }
        }
    }
}
