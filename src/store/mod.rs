//! In-memory arena stores for the three entity families.
//!
//! The registries are the sole owners of voters and candidates; elections
//! refer to them by ID only. Each store is injectable: the orchestrator is
//! handed its stores at construction, so tests can build isolated systems.
//!
//! Lock order, fixed across the crate: directory map, then a single
//! election's mutex, then a registry. No path acquires in the other
//! direction, and no lock is held across anything that can block.

pub mod directory;
pub mod registry;

pub use directory::ElectionDirectory;
pub use registry::{CandidateRegistry, VoterRegistry};

use std::sync::PoisonError;

/// Recover the guard from a poisoned lock.
///
/// A panic while holding one of these locks can only come from a bug in the
/// domain core; the data itself is never left half-written because every
/// operation validates before mutating. Continuing is safer than wedging
/// every subsequent request.
pub(crate) fn relock<G>(result: Result<G, PoisonError<G>>) -> G {
    result.unwrap_or_else(PoisonError::into_inner)
}
