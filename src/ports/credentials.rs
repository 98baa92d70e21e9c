use std::path::PathBuf;

use crate::youtube_rs::auth::RefreshTokenError;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No stored credentials at {0}. Authorize the app and save the token file there first.")]
    Missing(PathBuf),
    #[error("Failed to read token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Token file {path} is not valid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Access token expired and the token file has no refresh credentials")]
    CannotRefresh,
    #[error("Failed to refresh access token: {0}")]
    Refresh(#[from] RefreshTokenError),
}

/// Supplies a bearer token for the YouTube API. Called once per command.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, CredentialError>;
}
