//! Client side of the API: a reqwest wrapper plus the session it authenticates with

pub mod api_client;
pub mod session;

pub use api_client::ApiClient;
pub use session::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({error}): {message}")]
    Api { status: u16, error: String, message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
