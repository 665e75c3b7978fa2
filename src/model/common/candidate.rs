use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Candidate IDs are assigned sequentially on registration, starting at 1.
pub type CandidateId = u32;

/// States in the candidate lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Registered, awaiting an admin decision.
    Pending,
    /// On the ballot.
    Approved,
    /// Turned down; never on the ballot.
    Rejected,
}

impl CandidateStatus {
    /// Can a candidate move from `self` to `target`?
    /// Only pending candidates can be decided, and only once.
    pub fn can_become(self, target: CandidateStatus) -> bool {
        self == Self::Pending && target != Self::Pending
    }
}

impl From<CandidateStatus> for Bson {
    fn from(status: CandidateStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_candidates_can_be_decided() {
        use CandidateStatus::*;
        assert!(Pending.can_become(Approved));
        assert!(Pending.can_become(Rejected));
        assert!(!Pending.can_become(Pending));
        assert!(!Approved.can_become(Rejected));
        assert!(!Rejected.can_become(Approved));
        assert!(!Approved.can_become(Approved));
    }

    #[test]
    fn status_serialises_lowercase() {
        assert_eq!(
            Bson::from(CandidateStatus::Approved),
            Bson::String("approved".into())
        );
    }
}
