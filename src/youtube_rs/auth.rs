use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Access tokens this close to expiry are refreshed up front.
const EXPIRY_SKEW_SECS: i64 = 60;

const MAX_TOKEN_LIFETIME_SECS: u64 = 60 * 60 * 24 * 365;

/// Authorized-user token file, as written by Google's OAuth client libraries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub expiry: Option<String>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl AuthorizedUserToken {
    /// A token without a recorded expiry is assumed valid; an unreadable expiry is not.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.expiry {
            None => false,
            Some(expiry) => match DateTime::parse_from_rfc3339(expiry) {
                Ok(expiry) => expiry.with_timezone(&Utc) - TimeDelta::seconds(EXPIRY_SKEW_SECS) <= now,
                Err(_) => true,
            },
        }
    }

    /// Applies a refresh response, keeping the old refresh token if no new one was issued.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = response.access_token;
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        let lifetime = TimeDelta::seconds(response.expires_in.min(MAX_TOKEN_LIFETIME_SECS) as i64);
        self.expiry = Some((now + lifetime).to_rfc3339());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("Invalid refresh token: {reason}")]
    InvalidRefreshToken { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Exchange a refresh token for a new access token.
/// https://developers.google.com/identity/protocols/oauth2/native-app#offline
pub async fn refresh_access_token(
    token_uri: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, RefreshTokenError> {
    let client = reqwest::Client::new();

    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);
    params.insert("client_id", client_id);
    params.insert("client_secret", client_secret);

    let response = client
        .post(token_uri)
        .form(&params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RefreshTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(RefreshTokenError::InvalidRefreshToken {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(RefreshTokenError::FailedToParseResponse)
}
