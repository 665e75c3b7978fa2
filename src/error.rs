use std::fmt::Display;

use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::common::candidate::CandidateId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The eligibility gate rejected a repeat vote.
    #[error("Voter {0} has already voted")]
    AlreadyVoted(String),
    /// The candidate does not exist or is not approved.
    #[error("Candidate {0} does not exist or is not on the ballot")]
    InvalidCandidate(CandidateId),
    /// The ledger failed verification; results cannot be trusted.
    #[error("Ledger integrity check failed at entry {0}")]
    ChainBroken(u64),
    #[error(transparent)]
    Db(#[from] DbError),
    /// The store refused a write that would have violated a ledger invariant.
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Display) -> Self {
        Self::Status(Status::NotFound, format!("Not found: {what}"))
    }

    pub fn bad_request(why: impl Display) -> Self {
        Self::Status(Status::BadRequest, format!("Bad request: {why}"))
    }

    pub fn unauthorized(why: impl Display) -> Self {
        Self::Status(Status::Unauthorized, format!("Unauthorized: {why}"))
    }

    /// The HTTP status this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            Self::AlreadyVoted(_) => Status::Conflict,
            Self::InvalidCandidate(_) => Status::NotFound,
            Self::ChainBroken(_) => Status::ServiceUnavailable,
            Self::Db(_) | Self::Persistence(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Argon2(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(
            Error::AlreadyVoted("123456".into()).status(),
            Status::Conflict
        );
        assert_eq!(Error::InvalidCandidate(3).status(), Status::NotFound);
        assert_eq!(Error::ChainBroken(2).status(), Status::ServiceUnavailable);
        assert_eq!(
            Error::Persistence("fork".into()).status(),
            Status::InternalServerError
        );
        assert_eq!(Error::not_found("candidate 9").status(), Status::NotFound);
        assert_eq!(
            Error::Status(Status::Forbidden, "closed".into()).status(),
            Status::Forbidden
        );
    }
}
