//! Pure merge reducers
//!
//! Local optimistic writes and their own real-time echoes converge through
//! these functions, so each must be idempotent: applying the same logical
//! change twice yields the same final state. Matching is by the natural
//! composite key (replace-by-key, never append), with the second
//! application's payload winning.

use reel_common::{ContentType, ViewingProgress, WatchlistItem};

/// Replace the record with the same `ProgressKey` in place, else prepend
pub fn upsert_progress(list: &mut Vec<ViewingProgress>, record: ViewingProgress) {
    match list.iter().position(|r| r.key() == record.key()) {
        Some(index) => list[index] = record,
        None => list.insert(0, record),
    }
}

/// Remove the record with the given `ProgressKey`, if present
pub fn remove_progress(list: &mut Vec<ViewingProgress>, record: &ViewingProgress) {
    list.retain(|r| r.key() != record.key());
}

/// Replace the entry for the same content key in place, else prepend
pub fn add_watchlist_item(list: &mut Vec<WatchlistItem>, item: WatchlistItem) {
    match list
        .iter()
        .position(|i| i.matches(item.content_id, item.content_type))
    {
        Some(index) => list[index] = item,
        None => list.insert(0, item),
    }
}

/// Remove all entries matching the content key
pub fn remove_watchlist_item(
    list: &mut Vec<WatchlistItem>,
    content_id: u32,
    content_type: ContentType,
) {
    list.retain(|i| !i.matches(content_id, content_type));
}
