use super::types::{
    CreatedPlaylist, ListResponse, PlaylistInsertBody, PlaylistInsertSnippet, PlaylistResource,
    PlaylistStatus,
};
use super::{ApiError, YoutubeApi, send_empty, send_json};

const PLAYLIST_PARTS: &str = "snippet,contentDetails,status";

/// Fetch one page of the authenticated user's playlists.
///
/// Endpoint
/// - `GET /playlists?part=snippet,contentDetails,status&mine=true`
///
/// Pagination
/// - Pass the previous response's `nextPageToken` as `page_token`.
pub async fn list_my_playlists_page(
    api: &YoutubeApi,
    page_size: u32,
    page_token: Option<&str>,
) -> Result<ListResponse<PlaylistResource>, ApiError> {
    let mut url = api.endpoint("playlists")?;
    url.query_pairs_mut()
        .append_pair("part", PLAYLIST_PARTS)
        .append_pair("mine", "true")
        .append_pair("maxResults", &page_size.to_string());
    if let Some(token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", token);
    }

    send_json(api.get(url)).await
}

/// Look up a single playlist by id. `Ok(None)` when nothing matches.
pub async fn get_playlist(
    api: &YoutubeApi,
    playlist_id: &str,
) -> Result<Option<PlaylistResource>, ApiError> {
    let mut url = api.endpoint("playlists")?;
    url.query_pairs_mut()
        .append_pair("part", PLAYLIST_PARTS)
        .append_pair("id", playlist_id)
        .append_pair("maxResults", "1");

    let res: ListResponse<PlaylistResource> = send_json(api.get(url)).await?;
    Ok(res.items.into_iter().next())
}

/// Create a playlist and return its id.
///
/// Endpoint
/// - `POST /playlists?part=snippet,status`
pub async fn create_playlist(
    api: &YoutubeApi,
    title: &str,
    description: &str,
    privacy_status: &str,
) -> Result<String, ApiError> {
    let mut url = api.endpoint("playlists")?;
    url.query_pairs_mut().append_pair("part", "snippet,status");

    let body = PlaylistInsertBody {
        snippet: PlaylistInsertSnippet {
            title: title.to_string(),
            description: description.to_string(),
        },
        status: PlaylistStatus {
            privacy_status: Some(privacy_status.to_string()),
        },
    };

    let created: CreatedPlaylist = send_json(api.post(url).json(&body)).await?;
    Ok(created.id)
}

/// Endpoint
/// - `DELETE /playlists?id={id}`
pub async fn delete_playlist(api: &YoutubeApi, playlist_id: &str) -> Result<(), ApiError> {
    let mut url = api.endpoint("playlists")?;
    url.query_pairs_mut().append_pair("id", playlist_id);

    send_empty(api.delete(url)).await
}
