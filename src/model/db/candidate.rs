use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::candidate::CandidateSpec,
    common::candidate::{CandidateId, CandidateStatus},
};

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    pub roll_number: String,
    pub contact: String,
    pub platform_statement: String,
    pub status: CandidateStatus,
    pub vote_count: u64,
}

impl CandidateCore {
    /// Create a freshly registered candidate: pending, with no votes.
    pub fn new(spec: CandidateSpec) -> Self {
        Self {
            name: spec.name,
            roll_number: spec.roll_number,
            contact: spec.contact,
            platform_statement: spec.platform_statement,
            status: CandidateStatus::Pending,
            vote_count: 0,
        }
    }

    /// Count one more vote. Only approved candidates can receive votes.
    pub fn credit_vote(&mut self, id: CandidateId) -> Result<()> {
        if self.status != CandidateStatus::Approved {
            return Err(Error::InvalidCandidate(id));
        }
        self.vote_count += 1;
        Ok(())
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Candidate {
    pub fn new(id: CandidateId, candidate: NewCandidate) -> Self {
        Self { id, candidate }
    }
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}
