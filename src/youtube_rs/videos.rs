use super::types::{ListResponse, VideoResource};
use super::{ApiError, YoutubeApi, send_json};

/// Look up `contentDetails` for up to 50 videos in one call.
///
/// Endpoint
/// - `GET /videos?part=contentDetails&id={id1,id2,...}`
///
/// Videos that are private or deleted are silently missing from the response.
pub async fn list_video_details(
    api: &YoutubeApi,
    video_ids: &[String],
) -> Result<Vec<VideoResource>, ApiError> {
    let mut url = api.endpoint("videos")?;
    url.query_pairs_mut()
        .append_pair("part", "contentDetails")
        .append_pair("id", &video_ids.join(","))
        .append_pair("maxResults", &video_ids.len().to_string());

    let res: ListResponse<VideoResource> = send_json(api.get(url)).await?;
    Ok(res.items)
}
