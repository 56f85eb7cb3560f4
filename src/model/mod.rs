//! The election domain core: entities, the election state machine, and the
//! invariants they enforce. Everything here is synchronous and in-memory;
//! locking and HTTP concerns live in `store` and `api`.

pub mod ballot;
pub mod candidate;
pub mod election;
pub mod id;
pub mod voter;

pub use ballot::Ballot;
pub use candidate::Candidate;
pub use election::{CandidateResult, Election, ElectionSummary};
pub use id::{CandidateId, ElectionId, IdSequence, VoterId};
pub use voter::Voter;
