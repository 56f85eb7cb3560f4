use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{Election, ElectionId, ElectionSummary};

use super::relock;

/// System-wide owner of all elections.
///
/// Each election sits behind its own mutex, which the orchestrator holds
/// across the whole check-and-mutate span of a cast or close. That mutex is
/// the serialization boundary the one-vote guarantee relies on: two casts
/// for the same voter in the same election cannot interleave, and an
/// in-flight cast observes `closed` consistently. Operations on different
/// elections proceed in parallel.
#[derive(Debug, Default)]
pub struct ElectionDirectory {
    elections: RwLock<HashMap<ElectionId, Arc<Mutex<Election>>>>,
}

impl ElectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an election with an admin-chosen ID and a fixed time window.
    pub fn create(
        &self,
        id: ElectionId,
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<ElectionSummary> {
        if end_time <= start_time {
            return Err(Error::Validation(
                "election end time must be after its start time".to_string(),
            ));
        }
        let mut elections = relock(self.elections.write());
        match elections.entry(id.clone()) {
            Entry::Occupied(_) => Err(Error::Duplicate(id)),
            Entry::Vacant(entry) => {
                let election = Election::new(id, name, start_time, end_time);
                let summary = election.summary();
                entry.insert(Arc::new(Mutex::new(election)));
                Ok(summary)
            }
        }
    }

    /// Remove an election, handing back its final state so the caller can
    /// unlink anything still referring to it.
    pub fn delete(&self, id: &ElectionId) -> Result<Arc<Mutex<Election>>> {
        relock(self.elections.write())
            .remove(id)
            .ok_or_else(|| Error::not_found(format!("election {id}")))
    }

    /// Fetch the handle for one election. The directory's own lock is
    /// released before the caller locks the election.
    pub fn get(&self, id: &ElectionId) -> Result<Arc<Mutex<Election>>> {
        relock(self.elections.read())
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("election {id}")))
    }

    /// Summaries of every election, sorted by ID for stable output.
    pub fn list_all(&self) -> Vec<ElectionSummary> {
        let handles: Vec<_> = relock(self.elections.read()).values().cloned().collect();
        let mut summaries: Vec<_> = handles
            .iter()
            .map(|handle| relock(handle.lock()).summary())
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Summaries of elections ongoing at `now`, soonest-ending first.
    pub fn list_ongoing(&self, now: DateTime<Utc>) -> Vec<ElectionSummary> {
        let handles: Vec<_> = relock(self.elections.read()).values().cloned().collect();
        let mut summaries: Vec<_> = handles
            .iter()
            .filter_map(|handle| {
                let election = relock(handle.lock());
                election.is_ongoing(now).then(|| election.summary())
            })
            .collect();
        summaries.sort_by(|a, b| (a.end_time, &a.id).cmp(&(b.end_time, &b.id)));
        summaries
    }
}
