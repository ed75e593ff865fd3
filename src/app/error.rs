use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadLaterError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),

    #[error("Feed parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReadLaterError>;

/// Outcomes of a failed `authenticate` call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("the service did not answer in time")]
    ConnectionTimedOut,

    #[error("could not connect to the service")]
    ConnectionFailed,

    #[error("signed in, but the credentials could not be saved")]
    SavingFailed,

    #[error("an account is already signed in")]
    AlreadySignedIn,
}

/// Outcomes of a failed `submit` call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("the service rejected the bookmark")]
    InvalidRequest,

    /// `queued` is true when the attempt was persisted for a later retry.
    #[error("could not reach the service (saved for later: {queued})")]
    ConnectionFailed { queued: bool },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed feed at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },
}

impl ParseError {
    pub fn malformed(position: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }

    /// Re-anchor the error at a byte offset in the source document.
    pub fn at(self, position: u64) -> Self {
        match self {
            Self::Malformed { reason, .. } => Self::Malformed { position, reason },
        }
    }
}
