use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{
    voter::{age_on, valid_national_id, MIN_VOTER_AGE},
    Candidate, CandidateId, IdSequence, Voter, VoterId,
};

use super::relock;

/// System-wide owner of all registered voters.
///
/// This is the single authoritative validation point for national-ID format
/// and minimum age; nothing above it repeats the checks. A failed
/// registration stores nothing.
#[derive(Debug)]
pub struct VoterRegistry {
    ids: IdSequence,
    inner: RwLock<Voters>,
}

#[derive(Debug, Default)]
struct Voters {
    by_id: HashMap<VoterId, Voter>,
    /// Mirrors the unique constraint a relational backing would put on the
    /// national-ID column.
    national_ids: HashSet<String>,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("V"),
            inner: RwLock::new(Voters::default()),
        }
    }

    /// Validate and store a new voter, assigning a fresh ID.
    ///
    /// `today` is passed in rather than read from the clock so the age rule
    /// is deterministic under test.
    pub fn register(
        &self,
        name: &str,
        national_id: &str,
        date_of_birth: NaiveDate,
        today: NaiveDate,
    ) -> Result<Voter> {
        let name = name.trim();
        if name.len() < 2 {
            return Err(Error::Validation(
                "name must be at least 2 characters".to_string(),
            ));
        }
        if !valid_national_id(national_id) {
            return Err(Error::Validation(
                "national ID must be 8 to 12 uppercase letters or digits".to_string(),
            ));
        }
        if age_on(date_of_birth, today) < MIN_VOTER_AGE {
            return Err(Error::Validation(format!(
                "voter must be at least {MIN_VOTER_AGE} years old to register"
            )));
        }

        let mut voters = relock(self.inner.write());
        if !voters.national_ids.insert(national_id.to_string()) {
            return Err(Error::DuplicateNationalId);
        }
        let id = VoterId::new(self.ids.next());
        let voter = Voter::new(
            id.clone(),
            name.to_string(),
            national_id.to_string(),
            date_of_birth,
        );
        voters.by_id.insert(id, voter.clone());
        Ok(voter)
    }

    /// Look up a voter by ID, returning an owned copy.
    pub fn find(&self, id: &VoterId) -> Result<Voter> {
        relock(self.inner.read())
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("voter {id}")))
    }

    /// Run `f` against the stored voter without copying it out.
    pub fn read<R>(&self, id: &VoterId, f: impl FnOnce(&Voter) -> Result<R>) -> Result<R> {
        let voters = relock(self.inner.read());
        let voter = voters
            .by_id
            .get(id)
            .ok_or_else(|| Error::not_found(format!("voter {id}")))?;
        f(voter)
    }

    /// Mutate the stored voter under the registry's write lock.
    ///
    /// Callers that also hold an election mutex must take it before calling
    /// here (crate lock order).
    pub fn update<R>(&self, id: &VoterId, f: impl FnOnce(&mut Voter) -> Result<R>) -> Result<R> {
        let mut voters = relock(self.inner.write());
        let voter = voters
            .by_id
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("voter {id}")))?;
        f(voter)
    }
}

impl Default for VoterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// System-wide owner of all registered candidates.
#[derive(Debug)]
pub struct CandidateRegistry {
    ids: IdSequence,
    inner: RwLock<HashMap<CandidateId, Candidate>>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("C"),
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store a new candidate. Registration always succeeds.
    pub fn register(&self, name: &str, party: &str) -> Candidate {
        let id = CandidateId::new(self.ids.next());
        let candidate = Candidate::new(id.clone(), name.trim().to_string(), party.trim().to_string());
        relock(self.inner.write()).insert(id, candidate.clone());
        candidate
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        relock(self.inner.read()).contains_key(id)
    }

    /// Look up a candidate by ID, returning an owned copy.
    pub fn find(&self, id: &CandidateId) -> Result<Candidate> {
        relock(self.inner.read())
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("candidate {id}")))
    }

    /// Mutate the stored candidate under the registry's write lock.
    pub fn update<R>(
        &self,
        id: &CandidateId,
        f: impl FnOnce(&mut Candidate) -> Result<R>,
    ) -> Result<R> {
        let mut candidates = relock(self.inner.write());
        let candidate = candidates
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("candidate {id}")))?;
        f(candidate)
    }
}

impl Default for CandidateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
