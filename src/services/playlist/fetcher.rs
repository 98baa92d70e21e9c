use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheKind, PlaylistCache};
use crate::duration::UNKNOWN_DURATION;
use crate::models::{EnrichedItem, Page, PlaylistItem, PlaylistSummary};
use crate::ports::youtube::YoutubeClient;
use crate::services::playlist::enricher::enrich_durations;
use crate::youtube_rs::ApiError;

/// Cache id for the authenticated user's own playlist listing.
pub const MY_PLAYLISTS_CACHE_ID: &str = "mine";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch from YouTube: {0}")]
    Transport(#[from] ApiError),
}

/// Walk a cursor-paginated listing to the end, keeping page order.
async fn collect_pages<T, E, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
    FetchError: From<E>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0;

    loop {
        let page = fetch_page(cursor.take()).await?;
        pages += 1;
        items.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::debug!("Fetched {} items over {} pages", items.len(), pages);
    Ok(items)
}

/// Reads playlists and their items from YouTube, going through the local cache when asked.
pub struct PlaylistFetcher<C: YoutubeClient> {
    client: Arc<C>,
    cache: PlaylistCache,
    page_size: u32,
}

impl<C: YoutubeClient> PlaylistFetcher<C> {
    pub fn new(client: Arc<C>, cache: PlaylistCache, page_size: u32) -> Self {
        Self {
            client,
            cache,
            page_size,
        }
    }

    pub fn cache(&self) -> &PlaylistCache {
        &self.cache
    }

    pub async fn list_my_playlists(
        &self,
        use_cache: bool,
    ) -> Result<Vec<PlaylistSummary>, FetchError> {
        let client: &C = &self.client;
        let page_size = self.page_size;

        self.cached(CacheKind::Listing, MY_PLAYLISTS_CACHE_ID, use_cache, || {
            collect_pages(move |cursor| client.list_my_playlists(page_size, cursor))
        })
        .await
    }

    pub async fn get_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<Option<PlaylistSummary>, FetchError> {
        Ok(self.client.get_playlist(playlist_id).await?)
    }

    pub async fn fetch_items(
        &self,
        playlist_id: &str,
        use_cache: bool,
    ) -> Result<Vec<PlaylistItem>, FetchError> {
        let client: &C = &self.client;
        let page_size = self.page_size;

        self.cached(CacheKind::Items, playlist_id, use_cache, || {
            collect_pages(move |cursor| client.list_playlist_items(playlist_id, page_size, cursor))
        })
        .await
    }

    /// Items with their video durations. Items that do not reference a video are dropped.
    pub async fn fetch_items_with_durations(
        &self,
        playlist_id: &str,
        use_cache: bool,
    ) -> Result<Vec<EnrichedItem>, FetchError> {
        self.cached(CacheKind::ItemsWithDuration, playlist_id, use_cache, || {
            collect_pages(move |cursor| self.fetch_enriched_page(playlist_id, cursor))
        })
        .await
    }

    async fn fetch_enriched_page(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<EnrichedItem>, FetchError> {
        let page = self
            .client
            .list_playlist_items(playlist_id, self.page_size, cursor)
            .await?;

        let video_ids: Vec<String> = page
            .items
            .iter()
            .filter_map(|item| item.video_id.clone())
            .filter(|id| !id.is_empty())
            .collect();
        let durations = enrich_durations(self.client.as_ref(), &video_ids).await?;

        let items = page
            .items
            .into_iter()
            .filter_map(|item| {
                let duration = item
                    .video_id
                    .as_ref()
                    .and_then(|id| durations.get(id))
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_DURATION.to_string());
                let item_id = item.id.clone();
                let enriched = EnrichedItem::new(item, duration);
                if enriched.is_none() {
                    tracing::warn!("Skipping playlist item {} with no video id", item_id);
                }
                enriched
            })
            .collect();

        Ok(Page::new(items, page.next_cursor))
    }

    /// Serve `(kind, id)` from the cache, or run `fetch` and cache a non-empty result.
    async fn cached<T, F, Fut>(
        &self,
        kind: CacheKind,
        id: &str,
        use_cache: bool,
        fetch: F,
    ) -> Result<Vec<T>, FetchError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, FetchError>>,
    {
        if use_cache {
            if let Some(items) = self.cache.get::<T>(kind, id) {
                tracing::info!("Using cached {} for {} ({} items)", kind, id, items.len());
                return Ok(items);
            }
        }

        let items = fetch().await?;

        if use_cache && !items.is_empty() {
            match self.cache.put(kind, id, &items) {
                Ok(()) => tracing::debug!("Cached {} items under {}/{}", items.len(), kind, id),
                Err(e) => tracing::warn!("Failed to write {} cache for {}: {}", kind, id, e),
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::youtube::MockYoutubeClient;
    use crate::test_utils::{http_error, numbered_items, page_for_cursor, paginate, summary};
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    const PAGE_SIZE: u32 = 50;

    fn client_with_items(items: Vec<PlaylistItem>) -> MockYoutubeClient {
        let pages = paginate(&items, PAGE_SIZE as usize);
        let mut client = MockYoutubeClient::new();
        client
            .expect_list_playlist_items()
            .times(pages.len())
            .returning(move |_, page_size, cursor| {
                assert_eq!(page_size, PAGE_SIZE);
                Ok(page_for_cursor(&pages, cursor.as_deref()))
            });
        client
    }

    fn fetcher(client: MockYoutubeClient) -> PlaylistFetcher<MockYoutubeClient> {
        PlaylistFetcher::new(Arc::new(client), PlaylistCache::in_memory(), PAGE_SIZE)
    }

    #[tokio::test]
    async fn test_fetch_items_pagination_order() {
        for count in [0, 1, 50, 120] {
            let expected = numbered_items(0, count);
            let fetcher = fetcher(client_with_items(expected.clone()));

            let items = assert_ok!(fetcher.fetch_items("PL1", false).await);
            assert_eq!(items, expected, "count {}", count);
        }
    }

    #[tokio::test]
    async fn test_fetch_items_writes_and_reads_cache() {
        let expected = numbered_items(0, 3);
        let fetcher = fetcher(client_with_items(expected.clone()));

        assert_eq!(fetcher.fetch_items("PL1", true).await.unwrap(), expected);
        // Served from cache; the mock only allows one listing call.
        assert_eq!(fetcher.fetch_items("PL1", true).await.unwrap(), expected);
        assert_eq!(fetcher.cache().stats().unwrap().count_for(CacheKind::Items), 1);
    }

    #[tokio::test]
    async fn test_cached_fetch_makes_no_remote_call() {
        let mut client = MockYoutubeClient::new();
        client.expect_list_playlist_items().times(0);
        let fetcher = fetcher(client);

        let cached = numbered_items(0, 2);
        fetcher.cache().put(CacheKind::Items, "PL1", &cached).unwrap();

        assert_eq!(fetcher.fetch_items("PL1", true).await.unwrap(), cached);
    }

    #[tokio::test]
    async fn test_no_cache_bypasses_existing_entry() {
        let fresh = numbered_items(0, 2);
        let fetcher = fetcher(client_with_items(fresh.clone()));
        fetcher
            .cache()
            .put(CacheKind::Items, "PL1", &numbered_items(10, 1))
            .unwrap();

        assert_eq!(fetcher.fetch_items("PL1", false).await.unwrap(), fresh);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let fetcher = fetcher(client_with_items(Vec::new()));

        assert!(fetcher.fetch_items("PL1", true).await.unwrap().is_empty());
        assert_eq!(fetcher.cache().stats().unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_aborts_without_caching() {
        let pages = paginate(&numbered_items(0, 60), PAGE_SIZE as usize);
        let mut client = MockYoutubeClient::new();
        client
            .expect_list_playlist_items()
            .times(2)
            .returning(move |_, _, cursor| match cursor {
                None => Ok(pages[0].clone()),
                Some(_) => Err(http_error(503)),
            });
        let fetcher = fetcher(client);

        let err = assert_err!(fetcher.fetch_items("PL1", true).await);
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(fetcher.cache().stats().unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_list_my_playlists_cache_is_opt_in() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_list_my_playlists()
            .times(2)
            .returning(|_, _| Ok(Page::new(vec![summary("PL1", "Mix")], None)));
        let fetcher = fetcher(client);

        fetcher.list_my_playlists(false).await.unwrap();
        assert_eq!(fetcher.cache().stats().unwrap().count, 0);

        let playlists = fetcher.list_my_playlists(true).await.unwrap();
        assert_eq!(playlists[0].id, "PL1");
        assert_eq!(fetcher.cache().stats().unwrap().count_for(CacheKind::Listing), 1);

        // Third call is a cache hit.
        fetcher.list_my_playlists(true).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_items_with_durations() {
        let mut items = numbered_items(0, 4);
        items[2].video_id = None;
        let mut client = client_with_items(items);
        client
            .expect_get_video_durations()
            .times(1)
            .returning(|ids| {
                assert_eq!(ids, ["v0", "v1", "v3"]);
                Ok(HashMap::from([
                    ("v0".to_string(), "PT3M".to_string()),
                    ("v1".to_string(), "PT1H".to_string()),
                ]))
            });
        let fetcher = fetcher(client);

        let enriched = fetcher.fetch_items_with_durations("PL1", true).await.unwrap();
        let summary: Vec<(&str, &str)> = enriched
            .iter()
            .map(|e| (e.video_id.as_str(), e.duration.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("v0", "3:00"), ("v1", "1:00:00"), ("v3", UNKNOWN_DURATION)]
        );
        assert_eq!(
            fetcher
                .cache()
                .stats()
                .unwrap()
                .count_for(CacheKind::ItemsWithDuration),
            1
        );
    }

    #[tokio::test]
    async fn test_enriched_fetch_enriches_each_page() {
        let mut client = client_with_items(numbered_items(0, 75));
        client
            .expect_get_video_durations()
            .times(2)
            .returning(|ids| {
                assert!(ids.len() <= 50);
                Ok(ids
                    .iter()
                    .map(|id| (id.clone(), "PT10S".to_string()))
                    .collect())
            });
        let fetcher = fetcher(client);

        let enriched = fetcher.fetch_items_with_durations("PL1", false).await.unwrap();
        assert_eq!(enriched.len(), 75);
        assert!(enriched.iter().all(|e| e.duration == "0:10"));
        assert_eq!(enriched[74].video_id, "v74");
    }

    #[tokio::test]
    async fn test_enrichment_failure_aborts_fetch() {
        let mut client = client_with_items(numbered_items(0, 3));
        client
            .expect_get_video_durations()
            .returning(|_| Err(http_error(403)));
        let fetcher = fetcher(client);

        assert_err!(fetcher.fetch_items_with_durations("PL1", true).await);
        assert_eq!(fetcher.cache().stats().unwrap().count, 0);
    }
}
