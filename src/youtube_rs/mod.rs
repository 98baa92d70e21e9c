use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

pub mod auth;
pub mod playlist_items;
pub mod playlists;
pub mod types;
pub mod videos;

/// Docs:
/// https://developers.google.com/youtube/v3/docs
pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest `maxResults` the list endpoints accept, and the most ids `videos.list` takes.
pub const MAX_PAGE_SIZE: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("YouTube API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Authenticated handle on the YouTube Data API.
#[derive(Clone)]
pub struct YoutubeApi {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl YoutubeApi {
    pub fn new(access_token: String) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(YOUTUBE_API_BASE_URL)?,
            access_token,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.post(url))
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.delete(url))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }
}

/// Sends the request and decodes a JSON body, mapping non-2xx responses to [`ApiError::Status`].
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = send(request).await?;
    response
        .json::<T>()
        .await
        .map_err(ApiError::FailedToParseResponse)
}

/// Sends the request and discards the body.
pub(crate) async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
    send(request).await?;
    Ok(())
}

async fn send(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(ApiError::FailedToSendRequest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            body: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    Ok(response)
}
