//! The eligibility gate: each voter is admitted to vote exactly once.
//!
//! The gate's check and its flag are a single step. Stores apply it either as
//! an in-place transition on a locked record ([`Voter::check_and_reserve`]) or
//! as one conditional write ([`reserve_filter`] + [`reserve_update`]) that only
//! matches a voter who has not voted yet.

use mongodb::bson::{doc, Document};

use crate::error::{Error, Result};
use crate::model::db::voter::Voter;

/// The gate's success outcome: the voter may cast exactly one vote.
#[derive(Debug, PartialEq, Eq)]
pub struct Admitted {
    pub voter_id: String,
}

impl Voter {
    /// Admit this voter and flag them as having voted.
    /// A voter who is already flagged is rejected and left untouched.
    pub fn check_and_reserve(&mut self) -> Result<Admitted> {
        if self.has_voted {
            return Err(Error::AlreadyVoted(self.voter_id.clone()));
        }
        self.has_voted = true;
        Ok(Admitted {
            voter_id: self.voter_id.clone(),
        })
    }
}

/// Matches the given voter only if they have not voted yet.
pub fn reserve_filter(voter_id: &str) -> Document {
    doc! {
        "voter_id": voter_id,
        "has_voted": false,
    }
}

/// Flags a voter matched by [`reserve_filter`].
pub fn reserve_update() -> Document {
    doc! {
        "$set": {
            "has_voted": true,
        }
    }
}
