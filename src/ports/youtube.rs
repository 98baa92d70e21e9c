use std::collections::HashMap;

use crate::models::{NewPlaylist, Page, PlaylistItem, PlaylistSummary};
use crate::youtube_rs::ApiError;

/// Port trait wrapping the YouTube Data API calls the playlist engine depends on.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
/// Every call is a single remote request; none of them retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeClient: Send + Sync {
    /// One page of the authenticated user's playlists.
    async fn list_my_playlists(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistSummary>, ApiError>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<Option<PlaylistSummary>, ApiError>;

    /// One page of a playlist's items, in playlist order.
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistItem>, ApiError>;

    /// Raw ISO-8601 durations keyed by video id. Accepts at most 50 ids.
    async fn get_video_durations(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, String>, ApiError>;

    /// Returns the id of the new playlist.
    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<String, ApiError>;

    async fn delete_playlist(&self, playlist_id: &str) -> Result<(), ApiError>;

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: Option<u32>,
    ) -> Result<(), ApiError>;
}
