use chrono::{NaiveDate, Utc};
use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    Ballot, Candidate, CandidateId, CandidateResult, ElectionId, ElectionSummary, Voter, VoterId,
};
use crate::system::VotingSystem;

pub fn routes() -> Vec<Route> {
    routes![
        register_voter,
        get_voter,
        register_candidate,
        get_candidate,
        enroll_voter,
        cast_ballot,
        get_results,
        election_candidates,
        election_summary,
        list_elections,
    ]
}

/// A voter registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterSpec {
    pub name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
}

/// An API-friendly voter description with deterministic field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDescription {
    pub id: VoterId,
    pub name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub voted_elections: Vec<ElectionId>,
}

impl From<Voter> for VoterDescription {
    fn from(voter: Voter) -> Self {
        let mut voted_elections: Vec<_> = voter.voted_elections().cloned().collect();
        voted_elections.sort();
        Self {
            id: voter.id,
            name: voter.name,
            national_id: voter.national_id,
            date_of_birth: voter.date_of_birth,
            voted_elections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub party: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub elections: Vec<ElectionId>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        let mut elections: Vec<_> = candidate.elections().cloned().collect();
        elections.sort();
        Self {
            id: candidate.id,
            name: candidate.name,
            party: candidate.party,
            elections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub voter_id: VoterId,
}

/// A ballot the voter wishes to cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotSpec {
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
}

#[post("/voters", data = "<spec>", format = "json")]
async fn register_voter(
    spec: Json<VoterSpec>,
    system: &State<VotingSystem>,
) -> Result<Json<VoterDescription>> {
    let spec = spec.into_inner();
    let voter = system.register_voter(
        &spec.name,
        &spec.national_id,
        spec.date_of_birth,
        Utc::now().date_naive(),
    )?;
    Ok(Json(voter.into()))
}

#[get("/voters/<voter_id>")]
async fn get_voter(
    voter_id: VoterId,
    system: &State<VotingSystem>,
) -> Result<Json<VoterDescription>> {
    Ok(Json(system.find_voter(&voter_id)?.into()))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn register_candidate(
    spec: Json<CandidateSpec>,
    system: &State<VotingSystem>,
) -> Result<Json<CandidateDescription>> {
    let candidate = system.register_candidate(&spec.name, &spec.party);
    Ok(Json(candidate.into()))
}

#[get("/candidates/<candidate_id>")]
async fn get_candidate(
    candidate_id: CandidateId,
    system: &State<VotingSystem>,
) -> Result<Json<CandidateDescription>> {
    Ok(Json(system.find_candidate(&candidate_id)?.into()))
}

#[post("/elections/<election_id>/voters", data = "<enrollment>", format = "json")]
async fn enroll_voter(
    election_id: ElectionId,
    enrollment: Json<EnrollmentRequest>,
    system: &State<VotingSystem>,
) -> Result<()> {
    system.register_voter_for_election(&enrollment.voter_id, &election_id)
}

#[post("/elections/<election_id>/ballots", data = "<spec>", format = "json")]
async fn cast_ballot(
    election_id: ElectionId,
    spec: Json<BallotSpec>,
    system: &State<VotingSystem>,
) -> Result<Json<Ballot>> {
    let ballot = system.cast_ballot(&election_id, &spec.voter_id, &spec.candidate_id, Utc::now())?;
    Ok(Json(ballot))
}

#[get("/elections/<election_id>/results")]
async fn get_results(
    election_id: ElectionId,
    system: &State<VotingSystem>,
) -> Result<Json<Vec<CandidateResult>>> {
    Ok(Json(system.get_results(&election_id)?))
}

#[get("/elections/<election_id>/candidates")]
async fn election_candidates(
    election_id: ElectionId,
    system: &State<VotingSystem>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let candidates = system.election_candidates(&election_id)?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[get("/elections/<election_id>")]
async fn election_summary(
    election_id: ElectionId,
    system: &State<VotingSystem>,
) -> Result<Json<ElectionSummary>> {
    Ok(Json(system.election_summary(&election_id)?))
}

#[get("/elections?<state>")]
async fn list_elections(
    state: Option<&str>,
    system: &State<VotingSystem>,
) -> Result<Json<Vec<ElectionSummary>>> {
    let summaries = match state {
        None | Some("all") => system.list_all_elections(),
        Some("ongoing") => system.list_ongoing_elections(Utc::now()),
        Some(other) => {
            return Err(Error::Validation(format!(
                "unknown election filter {other:?}, expected \"ongoing\" or \"all\""
            )))
        }
    };
    Ok(Json(summaries))
}
