use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::ballot::Ballot;
use super::candidate::Candidate;
use super::id::{CandidateId, ElectionId, VoterId};
use super::voter::Voter;

/// A bounded-time ballot contest.
///
/// State machine: `Open` (initial) → `Closed` (terminal). The `closed` flag
/// never reverts, and no roster mutation is permitted once it is set.
///
/// An election stores only the IDs of its enrolled voters and assigned
/// candidates; the registries own the entities themselves. Candidates are
/// kept in assignment order, which doubles as the deterministic tie-break
/// for results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub name: String,
    /// Start of the voting window (inclusive).
    pub start_time: DateTime<Utc>,
    /// End of the voting window (inclusive).
    pub end_time: DateTime<Utc>,
    closed: bool,
    enrolled: HashSet<VoterId>,
    candidates: Vec<CandidateId>,
    ballots: Vec<Ballot>,
}

impl Election {
    pub fn new(
        id: ElectionId,
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            start_time,
            end_time,
            closed: false,
            enrolled: HashSet::new(),
            candidates: Vec::new(),
            ballots: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Not closed and `now` within the `[start, end]` window, both ends
    /// inclusive.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        !self.closed && now >= self.start_time && now <= self.end_time
    }

    /// Candidate IDs in assignment order.
    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    /// Ballots in the order they were cast.
    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn is_enrolled(&self, voter_id: &VoterId) -> bool {
        self.enrolled.contains(voter_id)
    }

    /// Add a registered voter to this election's roster.
    ///
    /// Eligibility is encoded in the type: a `Voter` can only be obtained
    /// from the registry, which implies successful registration.
    pub fn enroll_voter(&mut self, voter: &Voter) -> Result<()> {
        if self.closed {
            return Err(Error::AlreadyClosed(self.id.clone()));
        }
        if !self.enrolled.insert(voter.id.clone()) {
            return Err(Error::AlreadyEnrolled {
                voter: voter.id.clone(),
                election: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Cross-link a candidate into this election.
    pub fn add_candidate(&mut self, candidate: &mut Candidate) -> Result<()> {
        if self.closed {
            return Err(Error::AlreadyClosed(self.id.clone()));
        }
        if candidate.assigned_to(&self.id) || self.candidates.contains(&candidate.id) {
            return Err(Error::AlreadyAssigned {
                candidate: candidate.id.clone(),
                election: self.id.clone(),
            });
        }
        candidate.assign_to(self.id.clone())?;
        self.candidates.push(candidate.id.clone());
        Ok(())
    }

    /// Remove a candidate, permitted only while no ballots exist.
    /// Unlinks both sides of the candidate ↔ election association.
    pub fn remove_candidate(&mut self, candidate: &mut Candidate) -> Result<()> {
        if !self.ballots.is_empty() {
            return Err(Error::VotingStarted(self.id.clone()));
        }
        if !self.candidates.contains(&candidate.id) {
            return Err(Error::not_found(format!(
                "candidate {} in election {}",
                candidate.id, self.id
            )));
        }
        candidate.unassign_from(&self.id)?;
        self.candidates.retain(|id| id != &candidate.id);
        Ok(())
    }

    /// Cast a ballot for `candidate_id` on behalf of `voter`.
    ///
    /// All checks run before any mutation, so a rejected cast leaves both
    /// the voter and the election untouched. Marking the voter's voted-set
    /// and appending the ballot then happen back-to-back under the caller's
    /// election lock, making the pair atomic with respect to other casts.
    pub fn cast_ballot(
        &mut self,
        voter: &mut Voter,
        candidate_id: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Ballot> {
        if !self.is_ongoing(now) {
            return Err(Error::NotOngoing(self.id.clone()));
        }
        if !self.enrolled.contains(&voter.id) {
            return Err(Error::NotEnrolled {
                voter: voter.id.clone(),
                election: self.id.clone(),
            });
        }
        // One vote per voter, enforced twice over: the voter's own voted-set
        // and ballot identity within this election. Both must hold.
        if voter.has_voted_in(&self.id) || self.ballots.iter().any(|b| b.voter_id == voter.id) {
            return Err(Error::AlreadyVoted {
                voter: voter.id.clone(),
                election: self.id.clone(),
            });
        }
        if !self.candidates.contains(candidate_id) {
            return Err(Error::not_found(format!(
                "candidate {} in election {}",
                candidate_id, self.id
            )));
        }

        voter.mark_voted(self.id.clone())?;
        let ballot = Ballot::new(
            self.id.clone(),
            voter.id.clone(),
            candidate_id.clone(),
            now,
        );
        self.ballots.push(ballot.clone());
        Ok(ballot)
    }

    /// Irreversibly end voting.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::AlreadyClosed(self.id.clone()));
        }
        self.closed = true;
        Ok(())
    }

    /// Per-candidate ballot counts. Every assigned candidate appears, with
    /// zero for those who received no ballots.
    pub fn tally(&self) -> Result<HashMap<CandidateId, u64>> {
        if !self.closed {
            return Err(Error::NotClosed(self.id.clone()));
        }
        let mut counts: HashMap<CandidateId, u64> = self
            .candidates
            .iter()
            .map(|id| (id.clone(), 0))
            .collect();
        for ballot in &self.ballots {
            if let Some(count) = counts.get_mut(&ballot.candidate_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }

    /// A lightweight, owned view of this election's metadata and counts.
    pub fn summary(&self) -> ElectionSummary {
        ElectionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            closed: self.closed,
            enrolled_voters: self.enrolled.len(),
            candidates: self.candidates.len(),
            ballots_cast: self.ballots.len(),
        }
    }
}

/// A summary of an election, safe to hand out: owned values only, no
/// internal references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ElectionId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub closed: bool,
    pub enrolled_voters: usize,
    pub candidates: usize,
    pub ballots_cast: usize,
}

/// One row of a closed election's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate_id: CandidateId,
    pub name: String,
    pub party: String,
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    /// Example data for tests.
    impl Election {
        /// An election whose window comfortably contains `now`.
        pub fn current_example() -> Self {
            let now = Utc::now();
            Election::new(
                ElectionId::from("general-2026"),
                "General Election 2026".to_string(),
                now - Duration::days(1),
                now + Duration::days(6),
            )
        }

        /// An election whose window ended in the past.
        pub fn past_example() -> Self {
            let now = Utc::now();
            Election::new(
                ElectionId::from("general-2024"),
                "General Election 2024".to_string(),
                now - Duration::days(30),
                now - Duration::days(23),
            )
        }
    }

    fn voter(n: u32) -> Voter {
        let mut voter = Voter::example();
        voter.id = VoterId::new(format!("V{n:06}"));
        voter
    }

    fn candidate(n: u32) -> Candidate {
        let mut candidate = Candidate::example();
        candidate.id = CandidateId::new(format!("C{n:06}"));
        candidate
    }

    #[test]
    fn ongoing_window_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 6, 8, 20, 0, 0).unwrap();
        let mut election = Election::new(
            ElectionId::from("e1"),
            "E1".to_string(),
            start,
            end,
        );

        assert!(!election.is_ongoing(start - Duration::seconds(1)));
        assert!(election.is_ongoing(start));
        assert!(election.is_ongoing(end));
        assert!(!election.is_ongoing(end + Duration::seconds(1)));

        election.close().unwrap();
        assert!(!election.is_ongoing(start + Duration::days(1)));
    }

    #[test]
    fn close_is_idempotent_rejecting() {
        let mut election = Election::current_example();
        election.close().unwrap();
        assert!(election.is_closed());

        let err = election.close().unwrap_err();
        assert!(matches!(err, Error::AlreadyClosed(_)));
        assert!(election.is_closed());
    }

    #[test]
    fn enrollment_rules() {
        let mut election = Election::current_example();
        let voter = voter(1);

        election.enroll_voter(&voter).unwrap();
        assert!(election.is_enrolled(&voter.id));

        let err = election.enroll_voter(&voter).unwrap_err();
        assert!(matches!(err, Error::AlreadyEnrolled { .. }));

        election.close().unwrap();
        let other = voter_with_id("V000099");
        let err = election.enroll_voter(&other).unwrap_err();
        assert!(matches!(err, Error::AlreadyClosed(_)));
        assert!(!election.is_enrolled(&other.id));
    }

    fn voter_with_id(id: &str) -> Voter {
        let mut voter = Voter::example();
        voter.id = VoterId::from(id);
        voter
    }

    #[test]
    fn candidate_roster_rules() {
        let mut election = Election::current_example();
        let mut candidate = candidate(1);

        election.add_candidate(&mut candidate).unwrap();
        assert!(candidate.assigned_to(&election.id));
        assert_eq!(election.candidates(), [candidate.id.clone()]);

        let err = election.add_candidate(&mut candidate).unwrap_err();
        assert!(matches!(err, Error::AlreadyAssigned { .. }));

        election.remove_candidate(&mut candidate).unwrap();
        assert!(!candidate.assigned_to(&election.id));
        assert!(election.candidates().is_empty());

        let err = election.remove_candidate(&mut candidate).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn candidate_removal_blocked_once_voting_starts() {
        let mut election = Election::current_example();
        let mut a = candidate(1);
        let mut b = candidate(2);
        let mut voter = voter(1);

        election.add_candidate(&mut a).unwrap();
        election.add_candidate(&mut b).unwrap();
        election.enroll_voter(&voter).unwrap();
        election
            .cast_ballot(&mut voter, &a.id.clone(), Utc::now())
            .unwrap();

        let err = election.remove_candidate(&mut b).unwrap_err();
        assert!(matches!(err, Error::VotingStarted(_)));
        // The candidate stays assigned on both sides.
        assert!(b.assigned_to(&election.id));
        assert!(election.candidates().contains(&b.id));
    }

    #[test]
    fn cast_rejections_leave_state_unchanged() {
        let mut election = Election::current_example();
        let mut a = candidate(1);
        election.add_candidate(&mut a).unwrap();
        let candidate_id = a.id.clone();

        // Not enrolled.
        let mut stranger = voter(9);
        let err = election
            .cast_ballot(&mut stranger, &candidate_id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::NotEnrolled { .. }));
        assert!(election.ballots().is_empty());
        assert!(!stranger.has_voted_in(&election.id));

        // Unknown candidate.
        let mut voter = voter(1);
        election.enroll_voter(&voter).unwrap();
        let err = election
            .cast_ballot(&mut voter, &CandidateId::from("C999999"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(election.ballots().is_empty());
        assert!(!voter.has_voted_in(&election.id));

        // Outside the window.
        let mut past = Election::past_example();
        let mut b = candidate(2);
        past.add_candidate(&mut b).unwrap();
        past.enroll_voter(&voter).unwrap();
        let err = past
            .cast_ballot(&mut voter, &b.id.clone(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::NotOngoing(_)));
        assert!(past.ballots().is_empty());
    }

    #[test]
    fn second_cast_fails_with_already_voted() {
        let mut election = Election::current_example();
        let mut a = candidate(1);
        let mut b = candidate(2);
        let mut voter = voter(1);
        election.add_candidate(&mut a).unwrap();
        election.add_candidate(&mut b).unwrap();
        election.enroll_voter(&voter).unwrap();

        election
            .cast_ballot(&mut voter, &a.id.clone(), Utc::now())
            .unwrap();
        let err = election
            .cast_ballot(&mut voter, &b.id.clone(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted { .. }));

        // Exactly one ballot exists, for candidate A.
        assert_eq!(election.ballots().len(), 1);
        assert_eq!(election.ballots()[0].candidate_id, a.id);

        election.close().unwrap();
        let tally = election.tally().unwrap();
        assert_eq!(tally[&a.id], 1);
        assert_eq!(tally[&b.id], 0);
    }

    #[test]
    fn tally_requires_closed_and_covers_all_candidates() {
        let mut election = Election::current_example();
        let mut a = candidate(1);
        let mut b = candidate(2);
        let mut c = candidate(3);
        election.add_candidate(&mut a).unwrap();
        election.add_candidate(&mut b).unwrap();
        election.add_candidate(&mut c).unwrap();

        for n in 1..=3 {
            let mut voter = voter(n);
            election.enroll_voter(&voter).unwrap();
            let choice = if n < 3 { a.id.clone() } else { b.id.clone() };
            election.cast_ballot(&mut voter, &choice, Utc::now()).unwrap();
        }

        let err = election.tally().unwrap_err();
        assert!(matches!(err, Error::NotClosed(_)));

        election.close().unwrap();
        let tally = election.tally().unwrap();
        assert_eq!(tally.len(), 3);
        assert_eq!(tally[&a.id], 2);
        assert_eq!(tally[&b.id], 1);
        assert_eq!(tally[&c.id], 0);
        assert_eq!(tally.values().sum::<u64>(), election.ballots().len() as u64);
    }

    #[test]
    fn summary_reports_counts() {
        let mut election = Election::current_example();
        let mut a = candidate(1);
        let mut voter = voter(1);
        election.add_candidate(&mut a).unwrap();
        election.enroll_voter(&voter).unwrap();
        election
            .cast_ballot(&mut voter, &a.id.clone(), Utc::now())
            .unwrap();

        let summary = election.summary();
        assert_eq!(summary.id, election.id);
        assert_eq!(summary.enrolled_voters, 1);
        assert_eq!(summary.candidates, 1);
        assert_eq!(summary.ballots_cast, 1);
        assert!(!summary.closed);
    }
}
