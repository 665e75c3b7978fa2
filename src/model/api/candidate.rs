use serde::{Deserialize, Serialize};

use crate::model::{
    common::candidate::{CandidateId, CandidateStatus},
    db::candidate::Candidate,
};

/// A candidate's registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub roll_number: String,
    pub contact: String,
    pub platform_statement: String,
}

impl CandidateSpec {
    /// Every field must have some content.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("name", &self.name),
            ("roll_number", &self.roll_number),
            ("contact", &self.contact),
            ("platform_statement", &self.platform_statement),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(format!("candidate `{field}` must not be empty")),
            None => Ok(()),
        }
    }
}

/// Public view of a candidate. Contact details are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDesc {
    pub id: CandidateId,
    pub name: String,
    pub roll_number: String,
    pub platform_statement: String,
    pub status: CandidateStatus,
    pub vote_count: u64,
}

impl From<Candidate> for CandidateDesc {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.candidate.name,
            roll_number: candidate.candidate.roll_number,
            platform_statement: candidate.candidate.platform_statement,
            status: candidate.candidate.status,
            vote_count: candidate.candidate.vote_count,
        }
    }
}

/// Admin view of a candidate, including contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDetails {
    #[serde(flatten)]
    pub desc: CandidateDesc,
    pub contact: String,
}

impl From<Candidate> for CandidateDetails {
    fn from(candidate: Candidate) -> Self {
        let contact = candidate.contact.clone();
        Self {
            desc: candidate.into(),
            contact,
        }
    }
}
