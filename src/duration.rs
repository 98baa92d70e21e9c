use std::sync::LazyLock;

use regex::Regex;

/// Sentinel used when the videos endpoint did not report a duration.
pub const UNKNOWN_DURATION: &str = "Unknown";

/// Duration given to items that were fetched without the secondary lookup.
pub const PLACEHOLDER_DURATION: &str = "0:00";

static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("ISO-8601 duration pattern is valid")
});

/// Parses a YouTube `contentDetails.duration` token (e.g. `PT1H2M3S`) into seconds.
///
/// Days are folded into hours. Returns `None` when the token is malformed, has
/// no component at all (`P`, `PT`), or does not fit in a `u64` of seconds.
pub fn parse_iso8601(token: &str) -> Option<u64> {
    let captures = ISO8601_DURATION.captures(token.trim())?;
    if captures.iter().skip(1).all(|group| group.is_none()) {
        return None;
    }

    let component = |index: usize| -> Option<u64> {
        match captures.get(index) {
            Some(value) => value.as_str().parse::<u64>().ok(),
            None => Some(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;
    let seconds = component(4)?;

    days.checked_mul(24)?
        .checked_add(hours)?
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)
}

/// Formats seconds as `H:MM:SS` when there is at least one hour, `M:SS` otherwise.
pub fn format_compact(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Converts a raw ISO-8601 token to the compact display form.
///
/// Tokens that cannot be parsed are returned unchanged.
pub fn iso8601_to_compact(token: &str) -> String {
    match parse_iso8601(token) {
        Some(seconds) => format_compact(seconds),
        None => token.to_string(),
    }
}

/// Total seconds of a compact `M:SS` / `H:MM:SS` duration.
///
/// `"Unknown"` and anything malformed count as zero.
pub fn compact_to_seconds(text: &str) -> u64 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return 0;
    }

    let mut total: u64 = 0;
    for part in parts {
        let value = part.parse::<u64>().ok();
        match value.and_then(|value| total.checked_mul(60)?.checked_add(value)) {
            Some(next) => total = next,
            None => return 0,
        }
    }
    total
}
