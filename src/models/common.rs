use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Generic API response wrapper used across all handlers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Create a successful response without data
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            message: msg.clone(),
            data: None,
            error: Some(msg),
        }
    }
}

/// Outcome of a match (or of a predicted scoreline) from the home side's
/// perspective.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchOutcome {
    /// Classify a scoreline.
    pub fn of(home_score: i32, away_score: i32) -> Self {
        if home_score > away_score {
            MatchOutcome::HomeWin
        } else if away_score > home_score {
            MatchOutcome::AwayWin
        } else {
            MatchOutcome::Draw
        }
    }
}

impl Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
