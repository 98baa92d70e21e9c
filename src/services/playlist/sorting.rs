use chrono::{DateTime, Utc};

use crate::duration::compact_to_seconds;
use crate::models::{EnrichedItem, SortCriterion};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Date(DateTime<Utc>),
    Seconds(u64),
    Text(String),
    Position(u32),
}

fn sort_key(entry: &EnrichedItem, criterion: SortCriterion) -> SortKey {
    match criterion {
        SortCriterion::UploadDate => SortKey::Date(
            entry
                .item
                .published_at
                .as_deref()
                .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
                .map(|date| date.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        ),
        SortCriterion::Duration => SortKey::Seconds(compact_to_seconds(&entry.duration)),
        SortCriterion::Title => SortKey::Text(entry.item.title.to_lowercase()),
        SortCriterion::Channel => SortKey::Text(
            entry
                .item
                .channel_name()
                .map(str::to_lowercase)
                .unwrap_or_default(),
        ),
        SortCriterion::Position => SortKey::Position(entry.item.position.unwrap_or(0)),
    }
}

/// Stable sort; equal keys keep their input order in both directions.
pub fn sort_items(
    items: &[EnrichedItem],
    criterion: SortCriterion,
    reverse: bool,
) -> Vec<EnrichedItem> {
    let mut keyed: Vec<(SortKey, &EnrichedItem)> = items
        .iter()
        .map(|entry| (sort_key(entry, criterion), entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.cmp(b);
        if reverse { ordering.reverse() } else { ordering }
    });

    keyed.into_iter().map(|(_, entry)| entry.clone()).collect()
}

/// Like [`sort_items`], with the criterion given by name. Unknown names leave the order untouched.
pub fn sort_by_name(items: &[EnrichedItem], name: &str, reverse: bool) -> Vec<EnrichedItem> {
    match name.parse::<SortCriterion>() {
        Ok(criterion) => sort_items(items, criterion, reverse),
        Err(e) => {
            tracing::error!("{}", e);
            items.to_vec()
        }
    }
}
