use rocket::http::Status;

use crate::election::Election;
use crate::error::{Error, Result};
use crate::model::common::phase::Phase;

/// Fail with `403 Forbidden` unless the election is currently in `phase`.
pub fn require_phase(election: &Election, phase: Phase) -> Result<()> {
    let current = election.phase();
    if current == phase {
        Ok(())
    } else {
        Err(Error::Status(
            Status::Forbidden,
            format!("Only allowed during {phase:?}, but the election is in {current:?}"),
        ))
    }
}
