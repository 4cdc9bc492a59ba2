//! Tri-state interpretation of a raw query response
//!
//! The presence of at least one answer record for a zone's SOA query is
//! taken as evidence that the zone exists in the root zone; NXDOMAIN is
//! definite absence; everything else is a typed failure.

use std::fmt;

use crate::dns::protocol::{ResponseSummary, ResultCode};

/// Why a query produced no definite answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    MalformedQuery,
    ServerError,
    Refused,
    InvalidResponse,
    NoResponse,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match *self {
            FailureReason::MalformedQuery => "The name server was unable to interpret the query.",
            FailureReason::ServerError => "The name server encountered an error condition.",
            FailureReason::Refused => "The query was refused by name server.",
            FailureReason::InvalidResponse => "Invalid response from name server.",
            FailureReason::NoResponse => "Name server not responding. Try again.",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for FailureReason {}

/// Outcome of a single top-level verification query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    Exists,
    DoesNotExist,
    Failed(FailureReason),
}

impl QueryOutcome {
    /// Collapse the outcome to a boolean, surfacing failures as errors.
    /// Timeout exhaustion is a failure, never reported as absence.
    pub fn into_bool(self) -> std::result::Result<bool, FailureReason> {
        match self {
            QueryOutcome::Exists => Ok(true),
            QueryOutcome::DoesNotExist => Ok(false),
            QueryOutcome::Failed(reason) => Err(reason),
        }
    }
}

/// Map a decoded response to its outcome.
pub fn interpret(summary: &ResponseSummary) -> QueryOutcome {
    if !summary.response {
        return QueryOutcome::Failed(FailureReason::InvalidResponse);
    }

    match summary.rescode {
        ResultCode::FORMERR => QueryOutcome::Failed(FailureReason::MalformedQuery),
        ResultCode::SERVFAIL => QueryOutcome::Failed(FailureReason::ServerError),
        ResultCode::NXDOMAIN => QueryOutcome::DoesNotExist,
        ResultCode::REFUSED => QueryOutcome::Failed(FailureReason::Refused),
        _ => {
            if summary.answers > 0 {
                QueryOutcome::Exists
            } else {
                QueryOutcome::DoesNotExist
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn summary(response: bool, rescode: ResultCode, answers: u16) -> ResponseSummary {
        ResponseSummary {
            response,
            authoritative: false,
            truncated: false,
            rescode,
            answers,
        }
    }

    #[test]
    fn test_not_a_response() {
        assert_eq!(
            interpret(&summary(false, ResultCode::NOERROR, 1)),
            QueryOutcome::Failed(FailureReason::InvalidResponse)
        );
    }

    #[test]
    fn test_rcode_mapping() {
        assert_eq!(
            interpret(&summary(true, ResultCode::FORMERR, 0)),
            QueryOutcome::Failed(FailureReason::MalformedQuery)
        );
        assert_eq!(
            interpret(&summary(true, ResultCode::SERVFAIL, 0)),
            QueryOutcome::Failed(FailureReason::ServerError)
        );
        assert_eq!(
            interpret(&summary(true, ResultCode::NXDOMAIN, 0)),
            QueryOutcome::DoesNotExist
        );
        assert_eq!(
            interpret(&summary(true, ResultCode::REFUSED, 0)),
            QueryOutcome::Failed(FailureReason::Refused)
        );
    }

    #[test]
    fn test_answer_count_decides_existence() {
        assert_eq!(
            interpret(&summary(true, ResultCode::NOERROR, 1)),
            QueryOutcome::Exists
        );
        assert_eq!(
            interpret(&summary(true, ResultCode::NOERROR, 0)),
            QueryOutcome::DoesNotExist
        );

        // NOTIMP carries no special handling and falls through to the
        // answer count, same as NOERROR
        assert_eq!(
            interpret(&summary(true, ResultCode::NOTIMP, 0)),
            QueryOutcome::DoesNotExist
        );
    }

    #[test]
    fn test_into_bool() {
        assert_eq!(QueryOutcome::Exists.into_bool(), Ok(true));
        assert_eq!(QueryOutcome::DoesNotExist.into_bool(), Ok(false));
        assert_eq!(
            QueryOutcome::Failed(FailureReason::NoResponse).into_bool(),
            Err(FailureReason::NoResponse)
        );
    }
}
