use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::id::{CandidateId, ElectionId};

/// A registered candidate and the elections they are assigned to.
///
/// The assignment set is the candidate-side half of the candidate/election
/// cross-link; the election keeps the other half. Both sides mutate only
/// while the election is open and has no ballots cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Registry-assigned unique ID.
    pub id: CandidateId,
    /// Full name.
    pub name: String,
    /// Party label, e.g. "Independent".
    pub party: String,
    /// Elections this candidate is assigned to.
    elections: HashSet<ElectionId>,
}

impl Candidate {
    pub(crate) fn new(id: CandidateId, name: String, party: String) -> Self {
        Self {
            id,
            name,
            party,
            elections: HashSet::new(),
        }
    }

    /// Is this candidate assigned to the given election?
    pub fn assigned_to(&self, election_id: &ElectionId) -> bool {
        self.elections.contains(election_id)
    }

    /// Add the candidate-side half of the cross-link.
    pub(crate) fn assign_to(&mut self, election_id: ElectionId) -> Result<()> {
        if !self.elections.insert(election_id.clone()) {
            return Err(Error::AlreadyAssigned {
                candidate: self.id.clone(),
                election: election_id,
            });
        }
        Ok(())
    }

    /// Remove the candidate-side half of the cross-link.
    pub(crate) fn unassign_from(&mut self, election_id: &ElectionId) -> Result<()> {
        if !self.elections.remove(election_id) {
            return Err(Error::not_found(format!(
                "candidate {} in election {}",
                self.id, election_id
            )));
        }
        Ok(())
    }

    /// The elections this candidate is assigned to, in no particular order.
    pub fn elections(&self) -> impl Iterator<Item = &ElectionId> {
        self.elections.iter()
    }
}
