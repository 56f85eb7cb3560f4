use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::model::{
    Ballot, Candidate, CandidateId, CandidateResult, ElectionId, ElectionSummary, Voter, VoterId,
};
use crate::store::{relock, CandidateRegistry, ElectionDirectory, VoterRegistry};

/// The single entry point composing the registries and the election
/// directory.
///
/// The orchestrator validates that referenced entities exist, then delegates
/// each mutation to the owning election or registry, which enforces its own
/// invariants. The admin-credential gate for administrative operations lives
/// in the API layer; by the time a call reaches here it is authorized.
///
/// Stores are owned, not global: tests construct isolated systems with
/// `VotingSystem::new()`, and the HTTP layer manages one instance as Rocket
/// state.
#[derive(Debug, Default)]
pub struct VotingSystem {
    voters: VoterRegistry,
    candidates: CandidateRegistry,
    elections: ElectionDirectory,
}

impl VotingSystem {
    pub fn new() -> Self {
        Self {
            voters: VoterRegistry::new(),
            candidates: CandidateRegistry::new(),
            elections: ElectionDirectory::new(),
        }
    }

    /// Register a voter system-wide. The registry is the authoritative
    /// validation point for the national-ID and age rules.
    pub fn register_voter(
        &self,
        name: &str,
        national_id: &str,
        date_of_birth: NaiveDate,
        today: NaiveDate,
    ) -> Result<Voter> {
        self.voters.register(name, national_id, date_of_birth, today)
    }

    pub fn find_voter(&self, id: &VoterId) -> Result<Voter> {
        self.voters.find(id)
    }

    /// Register a candidate system-wide. Always succeeds.
    pub fn register_candidate(&self, name: &str, party: &str) -> Candidate {
        self.candidates.register(name, party)
    }

    pub fn find_candidate(&self, id: &CandidateId) -> Result<Candidate> {
        self.candidates.find(id)
    }

    /// Admin: create an election with a fixed voting window.
    pub fn create_election(
        &self,
        id: ElectionId,
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<ElectionSummary> {
        self.elections.create(id, name, start_time, end_time)
    }

    /// Admin: remove an election from the directory entirely. Candidates
    /// assigned to it are unlinked, so their assignment sets never point at
    /// a deleted election and the ID can be reused.
    pub fn delete_election(&self, id: &ElectionId) -> Result<()> {
        let handle = self.elections.delete(id)?;
        let election = relock(handle.lock());
        for candidate_id in election.candidates() {
            self.candidates
                .update(candidate_id, |candidate| candidate.unassign_from(id))?;
        }
        Ok(())
    }

    /// Admin: assign a system candidate to an election's roster.
    pub fn add_candidate_to_election(
        &self,
        election_id: &ElectionId,
        candidate_id: &CandidateId,
    ) -> Result<()> {
        let handle = self.elections.get(election_id)?;
        let mut election = relock(handle.lock());
        self.candidates
            .update(candidate_id, |candidate| election.add_candidate(candidate))
    }

    /// Admin: remove a candidate from an election that has no ballots yet.
    pub fn remove_candidate_from_election(
        &self,
        election_id: &ElectionId,
        candidate_id: &CandidateId,
    ) -> Result<()> {
        let handle = self.elections.get(election_id)?;
        let mut election = relock(handle.lock());
        self.candidates
            .update(candidate_id, |candidate| election.remove_candidate(candidate))
    }

    /// Admin: irreversibly end voting in an election.
    pub fn close_election(&self, election_id: &ElectionId) -> Result<()> {
        let handle = self.elections.get(election_id)?;
        let mut election = relock(handle.lock());
        election.close()
    }

    /// Enroll a registered voter onto an election's roster.
    pub fn register_voter_for_election(
        &self,
        voter_id: &VoterId,
        election_id: &ElectionId,
    ) -> Result<()> {
        let handle = self.elections.get(election_id)?;
        let mut election = relock(handle.lock());
        self.voters
            .read(voter_id, |voter| election.enroll_voter(voter))
    }

    /// Cast a ballot. The election mutex is held across the entire
    /// check-and-mark span, so concurrent casts for the same voter
    /// serialize and exactly one can succeed.
    pub fn cast_ballot(
        &self,
        election_id: &ElectionId,
        voter_id: &VoterId,
        candidate_id: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Ballot> {
        let handle = self.elections.get(election_id)?;
        let mut election = relock(handle.lock());
        if !self.candidates.contains(candidate_id) {
            return Err(Error::not_found(format!("candidate {candidate_id}")));
        }
        self.voters.update(voter_id, |voter| {
            election.cast_ballot(voter, candidate_id, now)
        })
    }

    /// Results of a closed election, sorted by votes descending. The sort is
    /// stable, so ties keep candidate assignment order.
    pub fn get_results(&self, election_id: &ElectionId) -> Result<Vec<CandidateResult>> {
        let handle = self.elections.get(election_id)?;
        let election = relock(handle.lock());
        let tally = election.tally()?;

        let mut rows = Vec::with_capacity(election.candidates().len());
        for candidate_id in election.candidates() {
            let candidate = self.candidates.find(candidate_id)?;
            rows.push(CandidateResult {
                candidate_id: candidate_id.clone(),
                name: candidate.name,
                party: candidate.party,
                votes: tally.get(candidate_id).copied().unwrap_or(0),
            });
        }
        rows.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(rows)
    }

    /// The candidates assigned to an election, in assignment order.
    pub fn election_candidates(&self, election_id: &ElectionId) -> Result<Vec<Candidate>> {
        let handle = self.elections.get(election_id)?;
        let candidate_ids: Vec<CandidateId> = {
            let election = relock(handle.lock());
            election.candidates().to_vec()
        };
        candidate_ids
            .iter()
            .map(|id| self.candidates.find(id))
            .collect()
    }

    pub fn election_summary(&self, election_id: &ElectionId) -> Result<ElectionSummary> {
        let handle = self.elections.get(election_id)?;
        let election = relock(handle.lock());
        Ok(election.summary())
    }

    pub fn list_all_elections(&self) -> Vec<ElectionSummary> {
        self.elections.list_all()
    }

    pub fn list_ongoing_elections(&self, now: DateTime<Utc>) -> Vec<ElectionSummary> {
        self.elections.list_ongoing(now)
    }
}
