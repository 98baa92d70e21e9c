use std::collections::HashMap;

use crate::models::{NewPlaylist, Page, PlaylistItem, PlaylistSummary, Visibility};
use crate::ports::youtube::YoutubeClient;
use crate::youtube_rs::playlist_items::{insert_playlist_item, list_playlist_items_page};
use crate::youtube_rs::playlists::{
    create_playlist, delete_playlist, get_playlist, list_my_playlists_page,
};
use crate::youtube_rs::types::{PlaylistItemResource, PlaylistResource};
use crate::youtube_rs::videos::list_video_details;
use crate::youtube_rs::{ApiError, YoutubeApi};

pub struct YoutubeHttpAdapter {
    api: YoutubeApi,
}

impl YoutubeHttpAdapter {
    pub fn new(access_token: String) -> Result<Self, ApiError> {
        Ok(Self {
            api: YoutubeApi::new(access_token)?,
        })
    }
}

fn to_summary(resource: PlaylistResource) -> PlaylistSummary {
    let visibility = resource
        .status
        .and_then(|status| status.privacy_status)
        .and_then(|status| status.parse::<Visibility>().ok());

    PlaylistSummary {
        id: resource.id,
        title: resource.snippet.title,
        description: resource
            .snippet
            .description
            .filter(|description| !description.is_empty()),
        published_at: resource.snippet.published_at,
        item_count: resource
            .content_details
            .map(|details| details.item_count)
            .unwrap_or(0),
        visibility,
    }
}

fn to_item(resource: PlaylistItemResource) -> PlaylistItem {
    let snippet = resource.snippet.unwrap_or_default();

    PlaylistItem {
        id: resource.id,
        title: snippet.title.unwrap_or_default(),
        channel_title: snippet.channel_title,
        video_owner_channel_title: snippet.video_owner_channel_title,
        description: snippet
            .description
            .filter(|description| !description.is_empty()),
        position: snippet.position,
        published_at: snippet.published_at,
        video_id: snippet.resource_id.and_then(|resource| resource.video_id),
    }
}

#[async_trait::async_trait]
impl YoutubeClient for YoutubeHttpAdapter {
    async fn list_my_playlists(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistSummary>, ApiError> {
        let res = list_my_playlists_page(&self.api, page_size, cursor.as_deref()).await?;
        Ok(Page::new(
            res.items.into_iter().map(to_summary).collect(),
            res.next_page_token,
        ))
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<Option<PlaylistSummary>, ApiError> {
        Ok(get_playlist(&self.api, playlist_id).await?.map(to_summary))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistItem>, ApiError> {
        let first_page = cursor.is_none();
        let res =
            list_playlist_items_page(&self.api, playlist_id, page_size, cursor.as_deref()).await?;
        if let Some(total) = res.page_info.as_ref().and_then(|info| info.total_results) {
            if first_page {
                tracing::info!("Playlist {} has {} items", playlist_id, total);
            }
        }
        Ok(Page::new(
            res.items.into_iter().map(to_item).collect(),
            res.next_page_token,
        ))
    }

    async fn get_video_durations(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, String>, ApiError> {
        let videos = list_video_details(&self.api, video_ids).await?;
        Ok(videos
            .into_iter()
            .filter_map(|video| {
                let duration = video.content_details?.duration?;
                Some((video.id, duration))
            })
            .collect())
    }

    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<String, ApiError> {
        create_playlist(
            &self.api,
            &playlist.title,
            &playlist.description,
            playlist.visibility.as_str(),
        )
        .await
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Result<(), ApiError> {
        delete_playlist(&self.api, playlist_id).await
    }

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        position: Option<u32>,
    ) -> Result<(), ApiError> {
        insert_playlist_item(&self.api, playlist_id, video_id, position).await
    }
}
