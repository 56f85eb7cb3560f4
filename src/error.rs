use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::warn;
use rocket::{http::Status, response::Responder, serde::json::Json};
use serde::Serialize;
use thiserror::Error;

use crate::model::{CandidateId, ElectionId, VoterId};

pub type Result<T> = std::result::Result<T, Error>;

/// Every way an operation can be rejected.
///
/// Each rejected operation leaves state unchanged and reports exactly one of
/// these members, so callers can render precise messages or map to status
/// codes. The core never retries; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, e.g. a bad national-ID format or an under-age voter.
    #[error("invalid input: {0}")]
    Validation(String),
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// The supplied credential does not match the admin credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// An election with this ID already exists.
    #[error("election {0} already exists")]
    Duplicate(ElectionId),
    /// A voter with this national ID is already registered.
    #[error("national ID already registered")]
    DuplicateNationalId,
    /// The election has already been closed.
    #[error("election {0} is already closed")]
    AlreadyClosed(ElectionId),
    /// The operation requires a closed election.
    #[error("election {0} is not closed yet")]
    NotClosed(ElectionId),
    /// The election is closed or outside its voting window.
    #[error("election {0} is not open for voting")]
    NotOngoing(ElectionId),
    /// The voter is not on this election's roster.
    #[error("voter {voter} is not enrolled in election {election}")]
    NotEnrolled {
        voter: VoterId,
        election: ElectionId,
    },
    /// The voter is already on this election's roster.
    #[error("voter {voter} is already enrolled in election {election}")]
    AlreadyEnrolled {
        voter: VoterId,
        election: ElectionId,
    },
    /// The candidate is already assigned to this election.
    #[error("candidate {candidate} is already assigned to election {election}")]
    AlreadyAssigned {
        candidate: CandidateId,
        election: ElectionId,
    },
    /// The voter has already cast a ballot in this election.
    #[error("voter {voter} has already cast a ballot in election {election}")]
    AlreadyVoted {
        voter: VoterId,
        election: ElectionId,
    },
    /// Roster mutation is forbidden once any ballot exists.
    #[error("voting has already started in election {0}")]
    VotingStarted(ElectionId),
    /// An auth token failed to decode or verify.
    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Duplicate(_)
            | Self::DuplicateNationalId
            | Self::AlreadyEnrolled { .. }
            | Self::AlreadyAssigned { .. }
            | Self::AlreadyVoted { .. } => Status::Conflict,
            Self::AlreadyClosed(_)
            | Self::NotClosed(_)
            | Self::NotOngoing(_)
            | Self::NotEnrolled { .. }
            | Self::VotingStarted(_) => Status::UnprocessableEntity,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
        }
    }
}

/// JSON body returned alongside every error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        warn!("{} {} rejected: {self}", req.method(), req.uri());
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            Error::Validation("bad".into()).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::Unauthorized("nope".into()).status(),
            Status::Unauthorized
        );
        assert_eq!(Error::not_found("voter V1").status(), Status::NotFound);
        assert_eq!(
            Error::Duplicate(ElectionId::from("e1")).status(),
            Status::Conflict
        );
        assert_eq!(
            Error::NotOngoing(ElectionId::from("e1")).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            Error::AlreadyVoted {
                voter: VoterId::from("V000001"),
                election: ElectionId::from("e1"),
            }
            .status(),
            Status::Conflict
        );
    }
}
