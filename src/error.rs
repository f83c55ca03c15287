use thiserror::Error;

/// Failure taxonomy for client operations. Validation, permission and
/// duplicate pre-checks are resolved locally and never reach the
/// service; everything else surfaces the server's status distinction.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    /// The role gate fired; names the role the operation requires.
    #[error("operation requires the {0} role")]
    Permission(String),

    /// Login was rejected by the service.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A protected call came back 401 — the session is no longer
    /// honoured and the caller should route back to login.
    #[error("session rejected by the server")]
    Unauthorized,

    #[error("malformed token: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error("server returned status {status}")]
    Remote { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session store error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
