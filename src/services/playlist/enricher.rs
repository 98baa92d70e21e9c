use std::collections::HashMap;

use crate::duration::iso8601_to_compact;
use crate::ports::youtube::YoutubeClient;
use crate::youtube_rs::ApiError;

/// Most ids a single `videos.list` call accepts.
pub const MAX_IDS_PER_CALL: usize = 50;

/// Look up display durations (`M:SS` / `H:MM:SS`) for up to [`MAX_IDS_PER_CALL`] videos.
///
/// Ids the API does not return are absent from the result. Oversized input is
/// refused with an empty mapping rather than truncated; callers chunk by page.
pub async fn enrich_durations<C: YoutubeClient + ?Sized>(
    client: &C,
    video_ids: &[String],
) -> Result<HashMap<String, String>, ApiError> {
    if video_ids.is_empty() {
        return Ok(HashMap::new());
    }

    if video_ids.len() > MAX_IDS_PER_CALL {
        tracing::error!(
            "Refusing to look up {} video durations at once (max {})",
            video_ids.len(),
            MAX_IDS_PER_CALL
        );
        return Ok(HashMap::new());
    }

    let raw = client.get_video_durations(video_ids).await?;
    tracing::debug!("Got durations for {}/{} videos", raw.len(), video_ids.len());

    Ok(raw
        .into_iter()
        .map(|(id, token)| {
            let display = iso8601_to_compact(&token);
            (id, display)
        })
        .collect())
}
