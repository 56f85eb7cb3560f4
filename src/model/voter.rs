use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::id::{ElectionId, VoterId};

/// Minimum age in whole years for voter registration.
pub const MIN_VOTER_AGE: i32 = 18;

/// A registered voter.
///
/// A value of this type only ever exists after successful registration;
/// the registry validates the national ID and age before constructing one,
/// so holding a `Voter` is proof of registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Registry-assigned unique ID.
    pub id: VoterId,
    /// Full name.
    pub name: String,
    /// Government-issued ID, unique across the registry.
    pub national_id: String,
    /// Date of birth, validated at registration.
    pub date_of_birth: NaiveDate,
    /// Elections this voter has already cast a ballot in.
    /// Grows monotonically; entries are never removed.
    voted_elections: HashSet<ElectionId>,
}

impl Voter {
    /// Construct a voter that has passed registration checks.
    /// Only the voter registry calls this.
    pub(crate) fn new(
        id: VoterId,
        name: String,
        national_id: String,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id,
            name,
            national_id,
            date_of_birth,
            voted_elections: HashSet::new(),
        }
    }

    /// Has this voter already cast a ballot in the given election?
    pub fn has_voted_in(&self, election_id: &ElectionId) -> bool {
        self.voted_elections.contains(election_id)
    }

    /// Record that this voter has cast a ballot in the given election.
    ///
    /// The election re-checks this under its own lock before calling, but
    /// the guard here must hold as well: both the voted-set and the ballot
    /// list enforce one-vote-per-voter.
    pub fn mark_voted(&mut self, election_id: ElectionId) -> Result<()> {
        if !self.voted_elections.insert(election_id.clone()) {
            return Err(Error::AlreadyVoted {
                voter: self.id.clone(),
                election: election_id,
            });
        }
        Ok(())
    }

    /// The elections this voter has voted in, in no particular order.
    pub fn voted_elections(&self) -> impl Iterator<Item = &ElectionId> {
        self.voted_elections.iter()
    }
}

/// Check a national ID against the required format:
/// 8 to 12 uppercase letters or digits.
pub fn valid_national_id(national_id: &str) -> bool {
    (8..=12).contains(&national_id.len())
        && national_id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Age in whole calendar years on `today`.
///
/// This is a calendar difference, not millisecond division: someone born
/// exactly `MIN_VOTER_AGE` years ago today counts as having had their
/// birthday.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Example data for tests.
    impl Voter {
        pub fn example() -> Self {
            Voter::new(
                VoterId::from("V000001"),
                "Ada Lovelace".to_string(),
                "AB12345678".to_string(),
                NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            )
        }
    }

    #[test]
    fn national_id_format() {
        assert!(valid_national_id("ABCD1234"));
        assert!(valid_national_id("A1B2C3D4E5F6"));
        assert!(!valid_national_id("ABC1234")); // too short
        assert!(!valid_national_id("ABCD1234ABCD5")); // too long
        assert!(!valid_national_id("abcd1234")); // lowercase
        assert!(!valid_national_id("ABCD 1234")); // space
        assert!(!valid_national_id(""));
    }

    #[test]
    fn age_counts_whole_calendar_years() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();

        // The day before the birthday.
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()), 17);
        // Exactly on the birthday.
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()), 18);
        // The day after.
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2018, 6, 16).unwrap()), 18);
    }

    #[test]
    fn leap_day_birthday() {
        let dob = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();

        // In a non-leap year the birthday has not happened on Feb 28.
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2018, 2, 28).unwrap()), 17);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2018, 3, 1).unwrap()), 18);
    }

    #[test]
    fn voted_set_grows_monotonically() {
        let mut voter = Voter::example();
        let election = ElectionId::from("general-2026");

        assert!(!voter.has_voted_in(&election));
        voter.mark_voted(election.clone()).unwrap();
        assert!(voter.has_voted_in(&election));

        // Marking twice is rejected and leaves the set unchanged.
        let err = voter.mark_voted(election.clone()).unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted { .. }));
        assert!(voter.has_voted_in(&election));
    }
}
