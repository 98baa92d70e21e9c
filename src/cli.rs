use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{OptionExt, WrapErr, eyre};
use reqwest::StatusCode;

use crate::cache::{CacheKind, FsCacheStore, PlaylistCache, format_size};
use crate::config::Config;
use crate::models::{PlaylistSummary, SortCriterion, Visibility};
use crate::output::{self, OutputFormat};
use crate::ports::credentials::CredentialProvider;
use crate::ports::youtube::YoutubeClient;
use crate::services::playlist::fetcher::PlaylistFetcher;
use crate::services::playlist::rebuild::{PlaylistRebuilder, RebuildError, RebuildRequest};
use crate::services::playlist::sorting::sort_by_name;
use crate::services::youtube::client::YoutubeHttpAdapter;

/// Cache backing a command. `--no-cache` runs never touch the cache directory.
pub fn open_cache(config: &Config, no_cache: bool) -> PlaylistCache {
    if no_cache {
        PlaylistCache::in_memory()
    } else {
        PlaylistCache::new(Arc::new(FsCacheStore::new(config.cache_directory())))
    }
}

/// Options of `create-sorted-playlist`; missing id or criterion are asked for interactively.
#[derive(Debug, Clone)]
pub struct SortedPlaylistArgs {
    pub playlist_id: Option<String>,
    pub criterion: Option<SortCriterion>,
    pub reverse: bool,
    pub title: Option<String>,
    pub visibility: Visibility,
    pub use_cache: bool,
}

/// An authenticated connection plus the services built on it.
pub struct Session<C: YoutubeClient> {
    client: Arc<C>,
    fetcher: PlaylistFetcher<C>,
    page_size: u32,
}

impl Session<YoutubeHttpAdapter> {
    pub async fn connect<P: CredentialProvider>(
        credentials: &P,
        cache: PlaylistCache,
        page_size: u32,
    ) -> Result<Self> {
        let access_token = credentials
            .access_token()
            .await
            .wrap_err("Failed to authenticate with YouTube")?;
        let client = YoutubeHttpAdapter::new(access_token)?;
        Ok(Self::new(Arc::new(client), cache, page_size))
    }
}

impl<C: YoutubeClient> Session<C> {
    pub fn new(client: Arc<C>, cache: PlaylistCache, page_size: u32) -> Self {
        let fetcher = PlaylistFetcher::new(client.clone(), cache, page_size);
        Self {
            client,
            fetcher,
            page_size,
        }
    }

    pub async fn auth_status(&self) -> Result<()> {
        let page = match self.client.list_my_playlists(1, None).await {
            Ok(page) => page,
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) => {
                return Err(e).wrap_err("Credentials were rejected, re-authorize and replace the token file");
            }
            Err(e) => return Err(e).wrap_err("Authentication failed or no access to playlists"),
        };
        println!(
            "Authentication verified ({} playlist(s) visible on the first page).",
            page.items.len()
        );
        Ok(())
    }

    pub async fn list_playlists(
        &self,
        use_cache: bool,
        path: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        let playlists = self.fetcher.list_my_playlists(use_cache).await?;
        output::emit(&output::render_playlists(&playlists, format)?, path)
    }

    pub async fn playlist_summary(
        &self,
        playlist_id: Option<String>,
        path: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        let Some(playlist_id) = self.resolve_playlist(playlist_id, "Select a playlist").await?
        else {
            return Ok(());
        };
        let playlist = self
            .fetcher
            .get_playlist(&playlist_id)
            .await?
            .ok_or_else(|| eyre!("No playlist found with ID: {}", playlist_id))?;
        output::emit(&output::render_summary(&playlist, format)?, path)
    }

    pub async fn list_videos(
        &self,
        playlist_id: Option<String>,
        use_cache: bool,
        path: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        let Some(playlist_id) = self.resolve_playlist(playlist_id, "Select a playlist").await?
        else {
            return Ok(());
        };
        let items = self.fetcher.fetch_items(&playlist_id, use_cache).await?;
        output::emit(&output::render_items(&items, format)?, path)
    }

    pub async fn list_videos_with_durations(
        &self,
        playlist_id: Option<String>,
        use_cache: bool,
        sort: Option<&str>,
        reverse: bool,
        path: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        let Some(playlist_id) = self.resolve_playlist(playlist_id, "Select a playlist").await?
        else {
            return Ok(());
        };
        let mut items = self
            .fetcher
            .fetch_items_with_durations(&playlist_id, use_cache)
            .await?;
        if let Some(sort) = sort {
            items = sort_by_name(&items, sort, reverse);
        }
        output::emit(&output::render_enriched_items(&items, format)?, path)
    }

    pub async fn create_sorted_playlist(
        &self,
        args: SortedPlaylistArgs,
        insert_delay: Duration,
    ) -> Result<()> {
        let SortedPlaylistArgs {
            playlist_id,
            criterion,
            reverse,
            title,
            visibility,
            use_cache,
        } = args;

        let Some(source_id) = self
            .resolve_playlist(playlist_id, "Select a playlist to sort")
            .await?
        else {
            return Ok(());
        };
        let Some(criterion) = criterion.map_or_else(select_criterion, |c| Ok(Some(c)))? else {
            return Ok(());
        };

        println!("\nCreating sorted playlist...");
        println!("Sort by: {}", criterion);
        println!("Order: {}", if reverse { "Descending" } else { "Ascending" });
        println!("Privacy: {}", visibility);

        let rebuilder = PlaylistRebuilder::new(
            self.client.clone(),
            PlaylistFetcher::new(
                self.client.clone(),
                self.fetcher.cache().clone(),
                self.page_size,
            ),
            insert_delay,
        );
        let request = RebuildRequest {
            source_id,
            criterion,
            reverse,
            title,
            visibility,
            use_cache,
        };

        match rebuilder.rebuild(&request).await {
            Ok(outcome) => {
                println!("\nSuccessfully created sorted playlist!");
                println!("Title: {}", outcome.title);
                println!("New playlist ID: {}", outcome.playlist_id);
                println!("Videos added: {}", outcome.inserted);
                Ok(())
            }
            Err(RebuildError::InsertFailed {
                playlist_id,
                index,
                video_id,
                report,
                source,
            }) => {
                print!(
                    "{}",
                    insert_failure_summary(
                        &playlist_id,
                        index,
                        &video_id,
                        report.successful,
                        report.failed
                    )
                );
                Err(source).wrap_err_with(|| {
                    format!(
                        "Failed to create sorted playlist: insert of {} at position {} failed",
                        video_id, index
                    )
                })
            }
            Err(e) => Err(e).wrap_err("Failed to create sorted playlist"),
        }
    }

    pub async fn delete_playlist(&self, playlist_id: Option<String>, force: bool) -> Result<()> {
        let playlist = match playlist_id {
            Some(playlist_id) => self
                .fetcher
                .get_playlist(&playlist_id)
                .await?
                .ok_or_else(|| eyre!("Playlist with ID {} not found", playlist_id))?,
            None => {
                let playlists = self.fetcher.list_my_playlists(false).await?;
                match select_playlist(&playlists, "Select a playlist to delete")? {
                    Some(index) => playlists[index].clone(),
                    None => return Ok(()),
                }
            }
        };

        if !force {
            println!("\nWARNING: You are about to delete the playlist:");
            println!("   Title: {}", playlist.title);
            println!("   ID: {}", playlist.id);
            println!("\n   This action cannot be undone!");
            if !confirm("Are you sure you want to delete this playlist?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        println!("\nDeleting playlist: '{}'...", playlist.title);
        self.client
            .delete_playlist(&playlist.id)
            .await
            .wrap_err("Failed to delete playlist")?;
        println!("Playlist deleted successfully!");
        Ok(())
    }

    /// Use the given id, or let the user pick one of their playlists.
    async fn resolve_playlist(
        &self,
        playlist_id: Option<String>,
        prompt: &str,
    ) -> Result<Option<String>> {
        if let Some(playlist_id) = playlist_id {
            return Ok(Some(playlist_id));
        }

        let playlists = self.fetcher.list_my_playlists(false).await?;
        Ok(select_playlist(&playlists, prompt)?.map(|index| playlists[index].id.clone()))
    }
}

/// What the user needs to resume by hand after a rebuild stopped part way.
fn insert_failure_summary(
    playlist_id: &str,
    index: usize,
    video_id: &str,
    successful: usize,
    failed: usize,
) -> String {
    format!(
        "\nOperation terminated due to errors.\n\
         Successful additions: {successful}\n\
         Failed additions: {failed}\n\
         Failed at position {index} (video {video_id})\n\
         Partially filled playlist left in place: {playlist_id}\n"
    )
}

pub fn cache_info(cache: &PlaylistCache) -> Result<()> {
    let stats = cache.stats().wrap_err("Failed to read cache")?;

    println!("Cache Statistics:");
    println!("  Total files: {}", stats.count);
    println!("  Total size: {}", format_size(stats.total_bytes));
    println!("  Playlist data: {} files", stats.count_for(CacheKind::Listing));
    println!("  Video lists: {} files", stats.count_for(CacheKind::Items));
    println!(
        "  Videos with durations: {} files",
        stats.count_for(CacheKind::ItemsWithDuration)
    );
    if stats.count == 0 {
        println!("  (Cache is empty)");
    }
    Ok(())
}

pub fn cache_clear(cache: &PlaylistCache, kind: Option<CacheKind>) -> Result<()> {
    let stats = cache.stats().wrap_err("Failed to read cache")?;
    if stats.count == 0 {
        println!("Cache is already empty.");
        return Ok(());
    }

    let removed = cache.clear(kind).wrap_err("Failed to clear cache")?;
    match (removed, kind) {
        (0, _) => println!("No cache files were removed."),
        (n, Some(kind)) => println!("Cleared {} {} cache files.", n, kind),
        (n, None) => println!("Cleared all {} cache files.", n),
    }
    Ok(())
}

/// Parse a 1-based menu choice into an index, `None` when out of range or not a number.
fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let choice = input.trim().parse::<usize>().ok()?;
    (1..=count).contains(&choice).then(|| choice - 1)
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<String> {
    write!(out, "{}: ", prompt)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).wrap_err("Failed to read from stdin")?;
    Ok(line)
}

fn choose<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    header: &str,
    options: &[String],
) -> Result<Option<usize>> {
    writeln!(out, "\n{}:", header)?;
    for (i, option) in options.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, option)?;
    }

    let line = prompt_line(input, out, &format!("Select [1-{}]", options.len()))?;
    let selection = parse_selection(&line, options.len());
    if selection.is_none() {
        writeln!(out, "Invalid selection.")?;
    }
    Ok(selection)
}

fn select_playlist(playlists: &[PlaylistSummary], header: &str) -> Result<Option<usize>> {
    if playlists.is_empty() {
        println!("No playlists found.");
        return Ok(None);
    }

    let options: Vec<String> = playlists
        .iter()
        .map(|playlist| {
            format!(
                "{} ({} videos, {}) (ID: {})",
                playlist.title,
                playlist.item_count,
                playlist
                    .visibility
                    .map(|visibility| visibility.as_str())
                    .unwrap_or("Unknown"),
                playlist.id
            )
        })
        .collect();
    choose(&mut std::io::stdin().lock(), &mut std::io::stderr(), header, &options)
}

fn select_criterion() -> Result<Option<SortCriterion>> {
    let options: Vec<String> = SortCriterion::ALL
        .iter()
        .map(|criterion| criterion.description().to_string())
        .collect();
    let selection = choose(
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
        "Select sorting method",
        &options,
    )?;
    Ok(selection.map(|index| SortCriterion::ALL[index]))
}

fn confirm_with<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    let answer = prompt_line(input, out, &format!("{} [y/N]", question))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn confirm(question: &str) -> Result<bool> {
    confirm_with(&mut std::io::stdin().lock(), &mut std::io::stderr(), question)
}

/// Token file from the flag, else from config.
pub fn token_file(config: &Config, flag: Option<&Path>) -> std::path::PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| config.token_file())
}

/// Config file from the flag, else the default location.
pub fn config_path(flag: Option<&Path>) -> Result<std::path::PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(Config::default_path)
        .ok_or_eyre("No default config path found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::models::Page;
    use crate::ports::credentials::{CredentialError, MockCredentialProvider};
    use crate::ports::youtube::MockYoutubeClient;
    use crate::test_utils::{http_error, summary};

    #[test]
    fn test_insert_failure_summary() {
        let summary = insert_failure_summary("DEST", 2, "v2", 2, 1);
        assert_eq!(
            summary,
            "\nOperation terminated due to errors.\n\
             Successful additions: 2\n\
             Failed additions: 1\n\
             Failed at position 2 (video v2)\n\
             Partially filled playlist left in place: DEST\n"
        );
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1\n", 3), Some(0));
        assert_eq!(parse_selection(" 3 ", 3), Some(2));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("two", 3), None);
    }

    #[test]
    fn test_choose_prints_menu() {
        let mut input = Cursor::new("2\n");
        let mut out = Vec::new();
        let options = vec!["First".to_string(), "Second".to_string()];

        let selection = choose(&mut input, &mut out, "Pick one", &options).unwrap();
        assert_eq!(selection, Some(1));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Pick one:\n1. First\n2. Second\n"));
        assert!(printed.ends_with("Select [1-2]: "));
    }

    #[test]
    fn test_choose_invalid() {
        let mut out = Vec::new();
        let options = vec!["Only".to_string()];

        let selection = choose(&mut Cursor::new("9\n"), &mut out, "Pick", &options).unwrap();
        assert_eq!(selection, None);
        assert!(String::from_utf8(out).unwrap().ends_with("Invalid selection.\n"));
    }

    #[test]
    fn test_confirm() {
        let mut out = Vec::new();
        assert!(confirm_with(&mut Cursor::new("y\n"), &mut out, "Sure?").unwrap());
        assert!(confirm_with(&mut Cursor::new("YES\n"), &mut out, "Sure?").unwrap());
        assert!(!confirm_with(&mut Cursor::new("\n"), &mut out, "Sure?").unwrap());
        assert!(!confirm_with(&mut Cursor::new(""), &mut out, "Sure?").unwrap());
    }

    #[tokio::test]
    async fn test_connect_surfaces_credential_error() {
        let mut credentials = MockCredentialProvider::new();
        credentials
            .expect_access_token()
            .returning(|| Err(CredentialError::CannotRefresh));

        let result = Session::connect(&credentials, PlaylistCache::in_memory(), 50).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_auth_status() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_list_my_playlists()
            .withf(|page_size, cursor| *page_size == 1 && cursor.is_none())
            .times(1)
            .returning(|_, _| Ok(Page::new(vec![summary("PL1", "Mix")], None)));
        let session = Session::new(Arc::new(client), PlaylistCache::in_memory(), 50);
        assert!(session.auth_status().await.is_ok());

        let mut failing = MockYoutubeClient::new();
        failing
            .expect_list_my_playlists()
            .returning(|_, _| Err(http_error(401)));
        let session = Session::new(Arc::new(failing), PlaylistCache::in_memory(), 50);
        assert!(session.auth_status().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_playlist_by_id_with_force() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_playlist()
            .returning(|id| Ok(Some(summary(id, "Old mix"))));
        client
            .expect_delete_playlist()
            .withf(|id| id == "PL9")
            .times(1)
            .returning(|_| Ok(()));
        let session = Session::new(Arc::new(client), PlaylistCache::in_memory(), 50);

        session
            .delete_playlist(Some("PL9".to_string()), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_playlist() {
        let mut client = MockYoutubeClient::new();
        client.expect_get_playlist().returning(|_| Ok(None));
        client.expect_delete_playlist().times(0);
        let session = Session::new(Arc::new(client), PlaylistCache::in_memory(), 50);

        assert!(session.delete_playlist(Some("PL9".into()), true).await.is_err());
    }

    #[test]
    fn test_cache_commands() {
        let cache = PlaylistCache::in_memory();
        cache
            .put(CacheKind::Items, "PL1", &[summary("a", "A")])
            .unwrap();

        cache_info(&cache).unwrap();
        cache_clear(&cache, Some(CacheKind::Items)).unwrap();
        assert_eq!(cache.stats().unwrap().count, 0);
        cache_clear(&cache, None).unwrap();
    }
}
