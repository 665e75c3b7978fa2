use rocket::{serde::json::Json, Route, State};

use crate::{
    election::Election,
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            vote::{VoteReceipt, VoteRequest},
        },
        common::phase::Phase,
        db::voter::Voter,
    },
};

use super::common::require_phase;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, voter_status]
}

#[post("/voter/vote", data = "<vote>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    vote: Json<VoteRequest>,
    election: &State<Election>,
) -> Result<Json<VoteReceipt>> {
    require_phase(election, Phase::VotingOpen)?;
    let entry = election.cast_vote(&token.id, vote.candidate_id).await?;
    Ok(Json(entry.into()))
}

#[get("/voter/status")]
async fn voter_status(token: AuthToken<Voter>, election: &State<Election>) -> Result<Json<Voter>> {
    let voter = election
        .voter(&token.id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id)))?;
    Ok(Json(voter))
}
