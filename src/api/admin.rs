use chrono::{DateTime, Utc};
use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{CandidateId, ElectionId, ElectionSummary};
use crate::system::VotingSystem;

use super::auth::AdminToken;

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        delete_election,
        add_candidate,
        remove_candidate,
        close_election,
    ]
}

/// An election specification, as submitted by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub id: ElectionId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAssignment {
    pub candidate_id: CandidateId,
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AdminToken,
    spec: Json<ElectionSpec>,
    system: &State<VotingSystem>,
) -> Result<Json<ElectionSummary>> {
    let spec = spec.into_inner();
    let summary = system.create_election(spec.id, spec.name, spec.start_time, spec.end_time)?;
    Ok(Json(summary))
}

#[delete("/elections/<election_id>")]
async fn delete_election(
    _token: AdminToken,
    election_id: ElectionId,
    system: &State<VotingSystem>,
) -> Result<()> {
    system.delete_election(&election_id)
}

#[post("/elections/<election_id>/candidates", data = "<assignment>", format = "json")]
async fn add_candidate(
    _token: AdminToken,
    election_id: ElectionId,
    assignment: Json<CandidateAssignment>,
    system: &State<VotingSystem>,
) -> Result<()> {
    system.add_candidate_to_election(&election_id, &assignment.candidate_id)
}

#[delete("/elections/<election_id>/candidates/<candidate_id>")]
async fn remove_candidate(
    _token: AdminToken,
    election_id: ElectionId,
    candidate_id: CandidateId,
    system: &State<VotingSystem>,
) -> Result<()> {
    system.remove_candidate_from_election(&election_id, &candidate_id)
}

#[post("/elections/<election_id>/close")]
async fn close_election(
    _token: AdminToken,
    election_id: ElectionId,
    system: &State<VotingSystem>,
) -> Result<()> {
    system.close_election(&election_id)
}
