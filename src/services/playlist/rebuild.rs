use std::sync::Arc;
use std::time::Duration;

use crate::duration::PLACEHOLDER_DURATION;
use crate::models::{EnrichedItem, NewPlaylist, SortCriterion, Visibility};
use crate::ports::youtube::YoutubeClient;
use crate::services::playlist::fetcher::{FetchError, PlaylistFetcher};
use crate::services::playlist::sorting::sort_items;
use crate::youtube_rs::ApiError;

pub const DEFAULT_INSERT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RebuildRequest {
    pub source_id: String,
    pub criterion: SortCriterion,
    pub reverse: bool,
    pub title: Option<String>,
    pub visibility: Visibility,
    pub use_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildOutcome {
    pub playlist_id: String,
    pub title: String,
    pub inserted: usize,
}

/// Tally of an insert replay that stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertReport {
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    #[error("Source playlist {0} not found")]
    SourceNotFound(String),
    #[error("Source playlist {0} has no videos to sort")]
    EmptySource(String),
    #[error("Failed to create destination playlist: {0}")]
    DestinationCreateFailed(#[source] ApiError),
    #[error(
        "Failed to insert video {video_id} at position {index} into {playlist_id} ({} added, {} failed): {source}",
        .report.successful,
        .report.failed
    )]
    InsertFailed {
        playlist_id: String,
        index: usize,
        video_id: String,
        report: InsertReport,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn direction(reverse: bool) -> (&'static str, &'static str) {
    if reverse {
        ("desc", "descending")
    } else {
        ("asc", "ascending")
    }
}

pub fn default_title(source_title: &str, criterion: SortCriterion, reverse: bool) -> String {
    format!("{} (sorted by {} {})", source_title, criterion, direction(reverse).0)
}

pub fn sorted_description(source_title: &str, criterion: SortCriterion, reverse: bool) -> String {
    format!(
        "Sorted copy of '{}' by {} ({})",
        source_title,
        criterion,
        direction(reverse).1
    )
}

/// Builds a sorted copy of a playlist as a new playlist.
///
/// Items are inserted one call at a time in sorted order. The first failed insert
/// stops the replay and the partially filled destination is left in place.
pub struct PlaylistRebuilder<C: YoutubeClient> {
    client: Arc<C>,
    fetcher: PlaylistFetcher<C>,
    insert_delay: Duration,
}

impl<C: YoutubeClient> PlaylistRebuilder<C> {
    pub fn new(client: Arc<C>, fetcher: PlaylistFetcher<C>, insert_delay: Duration) -> Self {
        Self {
            client,
            fetcher,
            insert_delay,
        }
    }

    pub async fn rebuild(&self, request: &RebuildRequest) -> Result<RebuildOutcome, RebuildError> {
        let source = self
            .fetcher
            .get_playlist(&request.source_id)
            .await?
            .ok_or_else(|| RebuildError::SourceNotFound(request.source_id.clone()))?;

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| default_title(&source.title, request.criterion, request.reverse));

        let items = self.source_items(request).await?;
        if items.is_empty() {
            return Err(RebuildError::EmptySource(request.source_id.clone()));
        }

        let sorted = sort_items(&items, request.criterion, request.reverse);
        tracing::info!(
            "Sorted {} videos from '{}' by {}",
            sorted.len(),
            source.title,
            request.criterion
        );

        let playlist_id = self
            .client
            .create_playlist(&NewPlaylist {
                title: title.clone(),
                description: sorted_description(&source.title, request.criterion, request.reverse),
                visibility: request.visibility,
            })
            .await
            .map_err(RebuildError::DestinationCreateFailed)?;
        tracing::info!("Created playlist {} ({})", title, playlist_id);

        let inserted = self.replay(&playlist_id, &sorted).await?;

        Ok(RebuildOutcome {
            playlist_id,
            title,
            inserted,
        })
    }

    async fn source_items(&self, request: &RebuildRequest) -> Result<Vec<EnrichedItem>, FetchError> {
        if request.criterion == SortCriterion::Duration {
            return self
                .fetcher
                .fetch_items_with_durations(&request.source_id, request.use_cache)
                .await;
        }

        let items = self
            .fetcher
            .fetch_items(&request.source_id, request.use_cache)
            .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let item_id = item.id.clone();
                let entry = EnrichedItem::new(item, PLACEHOLDER_DURATION);
                if entry.is_none() {
                    tracing::warn!("Skipping playlist item {} with no video id", item_id);
                }
                entry
            })
            .collect())
    }

    async fn replay(&self, playlist_id: &str, items: &[EnrichedItem]) -> Result<usize, RebuildError> {
        let mut successful = 0;

        for (index, entry) in items.iter().enumerate() {
            let position = u32::try_from(index).ok();
            if let Err(source) = self
                .client
                .insert_playlist_item(playlist_id, &entry.video_id, position)
                .await
            {
                let report = InsertReport {
                    successful,
                    failed: 1,
                };
                tracing::error!(
                    "Insert of {} at {} failed after {} successful inserts: {}",
                    entry.video_id,
                    index,
                    successful,
                    source
                );
                return Err(RebuildError::InsertFailed {
                    playlist_id: playlist_id.to_string(),
                    index,
                    video_id: entry.video_id.clone(),
                    report,
                    source,
                });
            }

            successful += 1;
            tracing::debug!("Inserted {} ({}/{})", entry.item.title, successful, items.len());

            if !self.insert_delay.is_zero() {
                tokio::time::sleep(self.insert_delay).await;
            }
        }

        Ok(successful)
    }
}
