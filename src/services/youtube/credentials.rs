use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::ports::credentials::{CredentialError, CredentialProvider};
use crate::youtube_rs::auth::{AuthorizedUserToken, refresh_access_token};

/// Credentials backed by an authorized-user token file.
///
/// An expired token is refreshed through its `token_uri` and the file is rewritten
/// with the new access token and expiry.
pub struct TokenFileCredentials {
    path: PathBuf,
}

impl TokenFileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<AuthorizedUserToken, CredentialError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CredentialError::Missing(self.path.clone()));
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| CredentialError::Invalid {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, token: &AuthorizedUserToken) -> Result<(), CredentialError> {
        let contents =
            serde_json::to_string_pretty(token).map_err(|source| CredentialError::Invalid {
                path: self.path.clone(),
                source,
            })?;

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| CredentialError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait::async_trait]
impl CredentialProvider for TokenFileCredentials {
    async fn access_token(&self) -> Result<String, CredentialError> {
        let mut token = self.load().await?;
        if !token.is_expired(Utc::now()) {
            return Ok(token.token);
        }

        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            token.client_id.as_deref(),
            token.client_secret.as_deref(),
            token.refresh_token.as_deref(),
        ) else {
            return Err(CredentialError::CannotRefresh);
        };

        tracing::info!("Access token expired, refreshing");
        let response =
            refresh_access_token(&token.token_uri, client_id, client_secret, refresh_token).await?;
        token.apply_refresh(response, Utc::now());

        if let Err(e) = self.save(&token).await {
            // The refreshed token is still usable for this run.
            tracing::warn!("Failed to save refreshed token: {}", e);
        } else {
            tracing::debug!("Saved refreshed token to {}", self.path.display());
        }

        Ok(token.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn write_token(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("token.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[tokio::test]
    async fn test_valid_token_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_token(
            dir.path(),
            r#"{"token": "ya29.valid", "expiry": "2999-01-01T00:00:00Z"}"#,
        );

        let credentials = TokenFileCredentials::new(path);
        assert_eq!(credentials.access_token().await.unwrap(), "ya29.valid");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = TokenFileCredentials::new(dir.path().join("absent.json"));

        let err = assert_err!(credentials.access_token().await);
        assert!(matches!(err, CredentialError::Missing(_)));
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_token(dir.path(), "not json");

        let err = assert_err!(TokenFileCredentials::new(path).access_token().await);
        assert!(matches!(err, CredentialError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_expired_without_refresh_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_token(
            dir.path(),
            r#"{"token": "old", "expiry": "2000-01-01T00:00:00Z"}"#,
        );

        let err = assert_err!(TokenFileCredentials::new(path).access_token().await);
        assert!(matches!(err, CredentialError::CannotRefresh));
    }
}
