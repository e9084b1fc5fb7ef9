use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::matches::{MatchStatus, Stage};
use crate::scoring::store::StoreError;

/// Failures of the scoring and standings pipeline.
///
/// `MatchNotScorable` and `RuleMissing` are raised before any write, so the
/// caller can retry once the precondition is fixed. `AggregateRefreshFailure`
/// is always safe to retry: a refresh is a pure recompute and never
/// double-applies.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("match {match_id} cannot be scored: {reason}")]
    MatchNotScorable {
        match_id: Uuid,
        reason: NotScorableReason,
    },

    #[error("no scoring rule configured for stage '{stage}'")]
    RuleMissing { stage: Stage },

    #[error("failed to refresh statistics for {scope}: {source}")]
    AggregateRefreshFailure {
        scope: RefreshScope,
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotScorableReason {
    NotFound,
    NotFinished(MatchStatus),
    MissingScores,
}

impl fmt::Display for NotScorableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotScorableReason::NotFound => write!(f, "match does not exist"),
            NotScorableReason::NotFinished(status) => {
                write!(f, "match status is '{}', not 'finished'", status.as_str())
            }
            NotScorableReason::MissingScores => write!(f, "final score is missing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    User(Uuid),
    Group(Uuid),
}

impl fmt::Display for RefreshScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshScope::User(id) => write!(f, "user {}", id),
            RefreshScope::Group(id) => write!(f, "group {}", id),
        }
    }
}
