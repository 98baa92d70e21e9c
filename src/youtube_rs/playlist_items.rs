use super::types::{
    ListResponse, PlaylistItemInsertBody, PlaylistItemInsertSnippet, PlaylistItemResource,
    ResourceId,
};
use super::{ApiError, YoutubeApi, send_empty, send_json};

/// Fetch one page of a playlist's items.
///
/// Endpoint
/// - `GET /playlistItems?part=snippet&playlistId={id}`
///
/// Returns
/// - The decoded envelope so the caller can follow `next_page_token`.
pub async fn list_playlist_items_page(
    api: &YoutubeApi,
    playlist_id: &str,
    page_size: u32,
    page_token: Option<&str>,
) -> Result<ListResponse<PlaylistItemResource>, ApiError> {
    let mut url = api.endpoint("playlistItems")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet")
        .append_pair("playlistId", playlist_id)
        .append_pair("maxResults", &page_size.to_string());
    if let Some(token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", token);
    }

    send_json(api.get(url)).await
}

/// Add one video to a playlist, optionally at a fixed position.
///
/// Endpoint
/// - `POST /playlistItems?part=snippet`
///
/// The API has no batch insert; every video costs one call.
pub async fn insert_playlist_item(
    api: &YoutubeApi,
    playlist_id: &str,
    video_id: &str,
    position: Option<u32>,
) -> Result<(), ApiError> {
    let mut url = api.endpoint("playlistItems")?;
    url.query_pairs_mut().append_pair("part", "snippet");

    let body = PlaylistItemInsertBody {
        snippet: PlaylistItemInsertSnippet {
            playlist_id: playlist_id.to_string(),
            resource_id: ResourceId {
                kind: Some("youtube#video".to_string()),
                video_id: Some(video_id.to_string()),
            },
            position,
        },
    };

    send_empty(api.post(url).json(&body)).await
}
