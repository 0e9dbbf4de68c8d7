use thiserror::Error;

/// Fallback shown when a failure carries no message of its own
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Why a single fetch attempt did not produce data
#[derive(Debug, Error)]
pub enum FetchError {
    /// The attempt was superseded or torn down; never surfaced to consumers
    #[error("request was cancelled")]
    Cancelled,

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Human readable message, never empty
    #[must_use]
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            msg
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
