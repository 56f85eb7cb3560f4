use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CandidateId, ElectionId, VoterId};

/// An immutable record of one voter's choice in one election.
///
/// A ballot is identified by who cast it, not what they chose: equality is
/// `(election_id, voter_id)` only. At most one ballot per pair may ever
/// exist; this is the central consistency guarantee of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub election_id: ElectionId,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(
        election_id: ElectionId,
        voter_id: VoterId,
        candidate_id: CandidateId,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            election_id,
            voter_id,
            candidate_id,
            cast_at,
        }
    }
}

impl PartialEq for Ballot {
    fn eq(&self, other: &Self) -> bool {
        self.election_id == other.election_id && self.voter_id == other.voter_id
    }
}

impl Eq for Ballot {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_candidate_and_time() {
        let election = ElectionId::from("general-2026");
        let voter = VoterId::from("V000001");
        let a = Ballot::new(
            election.clone(),
            voter.clone(),
            CandidateId::from("C000001"),
            Utc::now(),
        );
        let b = Ballot::new(
            election.clone(),
            voter.clone(),
            CandidateId::from("C000002"),
            Utc::now(),
        );
        assert_eq!(a, b);

        let other_voter = Ballot::new(
            election,
            VoterId::from("V000002"),
            CandidateId::from("C000001"),
            Utc::now(),
        );
        assert_ne!(a, other_voter);
    }
}
