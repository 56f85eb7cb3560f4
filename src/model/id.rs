use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Define an opaque string ID newtype.
///
/// The system never inspects ID contents; it only compares them, so the
/// wrapper exists purely to stop a voter ID being passed where a candidate
/// ID is expected.
macro_rules! string_id {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl<'a> FromParam<'a> for $name {
            type Error = std::convert::Infallible;

            fn from_param(param: &'a str) -> Result<Self, Self::Error> {
                Ok(Self(param.to_string()))
            }
        }
    };
}

string_id! {
    /// Unique ID of a registered voter, assigned by the voter registry.
    VoterId
}
string_id! {
    /// Unique ID of a registered candidate, assigned by the candidate registry.
    CandidateId
}
string_id! {
    /// Unique ID of an election, chosen by the administrator at creation.
    ElectionId
}

/// An injectable source of unique IDs: a prefixed monotonic counter.
///
/// The registries own one sequence each, so IDs are deterministic within a
/// process and tests can assert on them exactly.
#[derive(Debug)]
pub struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    /// Atomically take the next ID in the sequence.
    pub fn next(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{:06}", self.prefix, n)
    }
}
