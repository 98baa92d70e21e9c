use crate::models::{EnrichedItem, Page, PlaylistItem, PlaylistSummary, Visibility};
use crate::youtube_rs::ApiError;

pub fn item(id: &str, video_id: &str, title: &str) -> PlaylistItem {
    PlaylistItem {
        id: id.to_string(),
        title: title.to_string(),
        channel_title: Some("Channel".to_string()),
        video_owner_channel_title: None,
        description: None,
        position: None,
        published_at: None,
        video_id: Some(video_id.to_string()),
    }
}

/// `count` items numbered from `start`, with positions matching their index.
pub fn numbered_items(start: usize, count: usize) -> Vec<PlaylistItem> {
    (start..start + count)
        .map(|n| {
            let mut entry = item(&format!("pi{}", n), &format!("v{}", n), &format!("Video {}", n));
            entry.position = Some(n as u32);
            entry
        })
        .collect()
}

pub fn enriched(video_id: &str, title: &str, duration: &str) -> EnrichedItem {
    EnrichedItem::new(item(&format!("pi-{}", video_id), video_id, title), duration).unwrap()
}

pub fn summary(id: &str, title: &str) -> PlaylistSummary {
    PlaylistSummary {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        published_at: Some("2024-01-01T00:00:00Z".to_string()),
        item_count: 0,
        visibility: Some(Visibility::Private),
    }
}

/// Splits `items` into pages of `page_size`, with cursors `"page-1"`, `"page-2"`, ...
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Page<T>> {
    if items.is_empty() {
        return vec![Page::new(Vec::new(), None)];
    }

    let chunks: Vec<&[T]> = items.chunks(page_size).collect();
    let last = chunks.len() - 1;
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let next = (index < last).then(|| format!("page-{}", index + 1));
            Page::new(chunk.to_vec(), next)
        })
        .collect()
}

/// Looks up the page a cursor points at, as produced by [`paginate`].
pub fn page_for_cursor<T: Clone>(pages: &[Page<T>], cursor: Option<&str>) -> Page<T> {
    let index = match cursor {
        None => 0,
        Some(cursor) => cursor
            .strip_prefix("page-")
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or_else(|| panic!("Unexpected cursor: {}", cursor)),
    };
    pages[index].clone()
}

pub fn http_error(status: u16) -> ApiError {
    ApiError::Status {
        status: reqwest::StatusCode::from_u16(status).unwrap(),
        body: "error".to_string(),
    }
}
