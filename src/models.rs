use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Playlist visibility as understood by `status.privacyStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
    Unlisted,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

/// Summary of a remote playlist, decoupled from the API wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub item_count: u32,
    pub visibility: Option<Visibility>,
}

/// One entry of a remote playlist.
///
/// Fields the API may omit stay optional; the sort engine has a fallback for each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub title: String,
    pub channel_title: Option<String>,
    pub video_owner_channel_title: Option<String>,
    pub description: Option<String>,
    pub position: Option<u32>,
    pub published_at: Option<String>,
    pub video_id: Option<String>,
}

impl PlaylistItem {
    /// Owner channel name, falling back to the channel that added the item.
    pub fn channel_name(&self) -> Option<&str> {
        self.video_owner_channel_title
            .as_deref()
            .or(self.channel_title.as_deref())
    }
}

/// A playlist item with its referenced video id resolved and a display duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub item: PlaylistItem,
    pub video_id: String,
    pub duration: String,
}

impl EnrichedItem {
    /// Returns `None` when the item does not reference a video.
    pub fn new(item: PlaylistItem, duration: impl Into<String>) -> Option<Self> {
        let video_id = item.video_id.clone().filter(|id| !id.is_empty())?;
        Some(Self {
            item,
            video_id,
            duration: duration.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    #[value(name = "upload_date")]
    UploadDate,
    Duration,
    Title,
    Channel,
    Position,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 5] = [
        SortCriterion::UploadDate,
        SortCriterion::Duration,
        SortCriterion::Title,
        SortCriterion::Channel,
        SortCriterion::Position,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::UploadDate => "upload_date",
            SortCriterion::Duration => "duration",
            SortCriterion::Title => "title",
            SortCriterion::Channel => "channel",
            SortCriterion::Position => "position",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SortCriterion::UploadDate => "Sort by upload/publish date",
            SortCriterion::Duration => "Sort by video duration",
            SortCriterion::Title => "Sort by video title (alphabetical)",
            SortCriterion::Channel => "Sort by channel name (alphabetical)",
            SortCriterion::Position => "Sort by original playlist position",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortCriterion::ALL
            .into_iter()
            .find(|criterion| criterion.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sort criterion: {}", s))
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page, treating an empty cursor as the end of the listing.
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.filter(|cursor| !cursor.is_empty()),
        }
    }
}

/// Metadata for a playlist about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
}
