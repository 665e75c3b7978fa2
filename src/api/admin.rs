use rocket::{serde::json::Json, Route, State};

use crate::{
    election::Election,
    error::Result,
    model::{
        api::{auth::AuthToken, candidate::CandidateDetails},
        common::candidate::{CandidateId, CandidateStatus},
        db::admin::Admin,
        ledger::ChainVerdict,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        approve_candidate,
        reject_candidate,
        verify_ledger
    ]
}

/// Every candidate, or only those with the given status, with contact details.
#[get("/admin/candidates?<status>")]
async fn get_candidates(
    _token: AuthToken<Admin>,
    status: Option<CandidateStatus>,
    election: &State<Election>,
) -> Result<Json<Vec<CandidateDetails>>> {
    let candidates = election.list_candidates(status).await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[post("/admin/candidates/<id>/approve")]
async fn approve_candidate(
    _token: AuthToken<Admin>,
    id: CandidateId,
    election: &State<Election>,
) -> Result<Json<CandidateDetails>> {
    let candidate = election
        .set_candidate_status(id, CandidateStatus::Approved)
        .await?;
    Ok(Json(candidate.into()))
}

#[post("/admin/candidates/<id>/reject")]
async fn reject_candidate(
    _token: AuthToken<Admin>,
    id: CandidateId,
    election: &State<Election>,
) -> Result<Json<CandidateDetails>> {
    let candidate = election
        .set_candidate_status(id, CandidateStatus::Rejected)
        .await?;
    Ok(Json(candidate.into()))
}

/// Check the ledger at any point in the election.
#[get("/admin/ledger/verify")]
async fn verify_ledger(
    _token: AuthToken<Admin>,
    election: &State<Election>,
) -> Result<Json<ChainVerdict>> {
    Ok(Json(election.verify_ledger().await?))
}
