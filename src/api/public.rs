use rocket::{serde::json::Json, Route, State};

use crate::{
    election::Election,
    error::Result,
    model::{
        api::{
            candidate::{CandidateDesc, CandidateDetails, CandidateSpec},
            ledger::LedgerDump,
            phase::PhaseDesc,
        },
        common::{candidate::CandidateStatus, phase::Phase},
    },
};

use super::common::require_phase;

pub fn routes() -> Vec<Route> {
    routes![get_phase, register_candidate, get_candidates, get_results, get_ledger]
}

#[get("/phase")]
fn get_phase(election: &State<Election>) -> Json<PhaseDesc> {
    Json(PhaseDesc::at(election.now(), election.timeline()))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn register_candidate(
    spec: Json<CandidateSpec>,
    election: &State<Election>,
) -> Result<Json<CandidateDetails>> {
    require_phase(election, Phase::RegistrationOpen)?;
    let candidate = election.register_candidate(spec.0).await?;
    Ok(Json(candidate.into()))
}

/// The ballot: every approved candidate.
#[get("/candidates")]
async fn get_candidates(election: &State<Election>) -> Result<Json<Vec<CandidateDesc>>> {
    let candidates = election
        .list_candidates(Some(CandidateStatus::Approved))
        .await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[get("/results")]
async fn get_results(election: &State<Election>) -> Result<Json<Vec<CandidateDesc>>> {
    require_phase(election, Phase::Results)?;
    Ok(Json(election.results().await?))
}

/// The whole ledger and every candidate's count, for offline verification.
#[get("/ledger")]
async fn get_ledger(election: &State<Election>) -> Result<Json<LedgerDump>> {
    require_phase(election, Phase::Results)?;
    Ok(Json(election.dump().await?))
}
