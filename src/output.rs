use std::fmt::Write as _;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::Serialize;

use crate::duration::{compact_to_seconds, format_compact};
use crate::models::{EnrichedItem, PlaylistItem, PlaylistSummary};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn separator(out: &mut String, width: usize) {
    out.push_str(&"-".repeat(width));
    out.push('\n');
}

/// First `max` characters, with `...` appended when anything was cut.
fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn render_playlists(playlists: &[PlaylistSummary], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(playlists);
    }
    if playlists.is_empty() {
        return Ok("No playlists found.\n".to_string());
    }

    let mut out = String::new();
    writeln!(out, "Found {} playlist(s):", playlists.len())?;
    separator(&mut out, 80);
    for (i, playlist) in playlists.iter().enumerate() {
        writeln!(out, "{}. Title: {}", i + 1, playlist.title)?;
        writeln!(out, "   ID: {}", playlist.id)?;
        writeln!(
            out,
            "   Description: {}",
            truncate(playlist.description.as_deref().unwrap_or("No description"), 100)
        )?;
        writeln!(out, "   Video Count: {}", playlist.item_count)?;
        writeln!(
            out,
            "   Created: {}",
            playlist.published_at.as_deref().unwrap_or("Unknown")
        )?;
        writeln!(
            out,
            "   Privacy: {}",
            playlist
                .visibility
                .map(|visibility| visibility.as_str())
                .unwrap_or("Unknown")
        )?;
        separator(&mut out, 80);
    }
    Ok(out)
}

pub fn render_summary(playlist: &PlaylistSummary, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(playlist);
    }

    let mut out = String::new();
    writeln!(out, "Playlist Info:")?;
    separator(&mut out, 80);
    writeln!(out, "Title: {}", playlist.title)?;
    writeln!(out, "ID: {}", playlist.id)?;
    writeln!(
        out,
        "Description: {}",
        truncate(playlist.description.as_deref().unwrap_or("No description"), 300)
    )?;
    writeln!(out, "Video Count: {}", playlist.item_count)?;
    writeln!(
        out,
        "Created: {}",
        playlist.published_at.as_deref().unwrap_or("Unknown")
    )?;
    writeln!(
        out,
        "Privacy: {}",
        playlist
            .visibility
            .map(|visibility| visibility.as_str())
            .unwrap_or("Unknown")
    )?;
    separator(&mut out, 80);
    Ok(out)
}

fn write_item(
    out: &mut String,
    number: usize,
    item: &PlaylistItem,
    duration: Option<&str>,
) -> std::fmt::Result {
    let video_id = item.video_id.as_deref().unwrap_or("Unknown");

    writeln!(out, "{}. Title: {}", number, item.title)?;
    writeln!(out, "   Video ID: {}", video_id)?;
    writeln!(out, "   Channel: {}", item.channel_name().unwrap_or("Unknown"))?;
    if let Some(duration) = duration {
        writeln!(out, "   Duration: {}", duration)?;
    }
    match item.position {
        Some(position) => writeln!(out, "   Position: {}", position)?,
        None => writeln!(out, "   Position: Unknown")?,
    }
    writeln!(
        out,
        "   Published: {}",
        item.published_at.as_deref().unwrap_or("Unknown")
    )?;
    if item.video_id.is_some() {
        writeln!(out, "   URL: {}{}", WATCH_URL, video_id)?;
    }
    if let Some(description) = &item.description {
        writeln!(out, "   Description: {}", truncate(description, 100))?;
    }
    Ok(())
}

pub fn render_items(items: &[PlaylistItem], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(items);
    }
    if items.is_empty() {
        return Ok("No videos found in this playlist.\n".to_string());
    }

    let mut out = String::new();
    writeln!(out, "Found {} video(s) in playlist:", items.len())?;
    separator(&mut out, 80);
    for (i, item) in items.iter().enumerate() {
        write_item(&mut out, i + 1, item, None)?;
        separator(&mut out, 80);
    }
    Ok(out)
}

pub fn render_enriched_items(items: &[EnrichedItem], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(items);
    }
    if items.is_empty() {
        return Ok("No videos found in this playlist.\n".to_string());
    }

    let mut out = String::new();
    writeln!(out, "Found {} video(s) in playlist:", items.len())?;
    separator(&mut out, 90);
    for (i, entry) in items.iter().enumerate() {
        write_item(&mut out, i + 1, &entry.item, Some(&entry.duration))?;
        separator(&mut out, 90);
    }

    let total: u64 = items
        .iter()
        .map(|entry| compact_to_seconds(&entry.duration))
        .fold(0, u64::saturating_add);
    if total > 0 {
        writeln!(out, "\nTotal playlist duration: {}", format_compact(total))?;
    }
    Ok(out)
}

/// Write rendered output to `path`, or stdout when no path is given.
pub fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered)
                .wrap_err_with(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!("Wrote output to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{enriched, item, summary};

    #[test]
    fn test_render_playlists_text() {
        let mut playlist = summary("PL1", "Road trip");
        playlist.item_count = 7;
        let rendered = render_playlists(&[playlist], OutputFormat::Text).unwrap();

        assert!(rendered.starts_with("Found 1 playlist(s):\n"));
        assert!(rendered.contains("1. Title: Road trip\n"));
        assert!(rendered.contains("   Description: No description\n"));
        assert!(rendered.contains("   Video Count: 7\n"));
        assert!(rendered.contains("   Privacy: private\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            render_playlists(&[], OutputFormat::Text).unwrap(),
            "No playlists found.\n"
        );
        assert_eq!(
            render_items(&[], OutputFormat::Text).unwrap(),
            "No videos found in this playlist.\n"
        );
        assert_eq!(render_items(&[], OutputFormat::Json).unwrap(), "[]\n");
    }

    #[test]
    fn test_render_summary_truncates_description() {
        let mut playlist = summary("PL1", "Mix");
        playlist.description = Some("x".repeat(301));
        let rendered = render_summary(&playlist, OutputFormat::Text).unwrap();

        assert!(rendered.contains(&format!("Description: {}...\n", "x".repeat(300))));
    }

    #[test]
    fn test_render_items_text() {
        let mut entry = item("pi1", "abc123", "Song");
        entry.position = Some(4);
        entry.video_owner_channel_title = Some("Artist".into());
        let rendered = render_items(&[entry], OutputFormat::Text).unwrap();

        assert!(rendered.contains("   Video ID: abc123\n"));
        assert!(rendered.contains("   Channel: Artist\n"));
        assert!(rendered.contains("   Position: 4\n"));
        assert!(rendered.contains("   URL: https://www.youtube.com/watch?v=abc123\n"));
        assert!(!rendered.contains("Duration"));
    }

    #[test]
    fn test_render_enriched_total_duration() {
        let items = vec![
            enriched("a", "A", "59:30"),
            enriched("b", "B", "1:00"),
            enriched("c", "C", "Unknown"),
        ];
        let rendered = render_enriched_items(&items, OutputFormat::Text).unwrap();

        assert!(rendered.contains("   Duration: 59:30\n"));
        assert!(rendered.contains("   Duration: Unknown\n"));
        assert!(rendered.ends_with("\nTotal playlist duration: 1:00:30\n"));
    }

    #[test]
    fn test_render_enriched_json() {
        let rendered =
            render_enriched_items(&[enriched("a", "A", "3:00")], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value[0]["video_id"], "a");
        assert_eq!(value[0]["duration"], "3:00");
        assert_eq!(value[0]["item"]["title"], "A");
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        emit("hello\n", Some(path.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
