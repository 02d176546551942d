use reqwest::StatusCode;
use thiserror::Error;

/// Startup configuration problems. Always fatal before the listener binds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Client-credentials exchange with the Workspace token endpoint failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint rejected credentials: {status}")]
    Rejected { status: StatusCode, body: String },

    #[error("token response malformed: {0}")]
    MalformedResponse(String),
}

/// Outbound message could not be delivered to a space.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("message request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("message not accepted: {status}")]
    Delivery { status: StatusCode, body: String },
}

impl SendError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SendError::Auth(_))
    }
}
