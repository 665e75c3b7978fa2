use serde::{Deserialize, Serialize};

/// A voter, identified by their (already validated) voter ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub voter_id: String,
    /// Only ever changes from false to true, through the eligibility gate.
    pub has_voted: bool,
}

impl Voter {
    /// A voter seen for the first time.
    pub fn new(voter_id: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            has_voted: false,
        }
    }
}
