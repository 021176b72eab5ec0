//! Workout history: an append-only list of completed sessions.
//!
//! Loading never fails: a missing or malformed history is an empty one.
//! The selectors below aggregate history for the home screen and the
//! history summary.

use crate::player::PlayerState;
use crate::storage::{load_json_list, update_json_list, KeyValueStore};
use crate::{Result, WorkoutHistoryItem};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Storage key for the history list
pub const HISTORY_KEY: &str = "workout_history_v1";

/// Load the full history in stored (append) order
pub fn load_history<S: KeyValueStore + ?Sized>(store: &S) -> Vec<WorkoutHistoryItem> {
    let history: Vec<WorkoutHistoryItem> = load_json_list(store, HISTORY_KEY);
    tracing::debug!("Loaded {} history items", history.len());
    history
}

/// Append one completed session
pub fn append_history<S: KeyValueStore + ?Sized>(
    store: &S,
    item: &WorkoutHistoryItem,
) -> Result<()> {
    update_json_list(store, HISTORY_KEY, |history: &mut Vec<WorkoutHistoryItem>| {
        history.push(item.clone());
        Ok(true)
    })?;
    tracing::info!(
        "Appended session {} ({}, {}s) to history",
        item.id,
        item.playlist_name,
        item.actual_duration_sec
    );
    Ok(())
}

/// Drop the whole history
pub fn clear_history<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(HISTORY_KEY)?;
    tracing::info!("Cleared workout history");
    Ok(())
}

/// Record a finished session, if the player has completed
///
/// Returns the stored item. A failed append is logged and otherwise
/// ignored: losing one history record must not interrupt the user.
pub fn record_completion<S: KeyValueStore + ?Sized>(
    store: &S,
    player: &PlayerState,
    completed_at: DateTime<Utc>,
) -> Option<WorkoutHistoryItem> {
    let summary = player.completion_summary(completed_at)?;
    let item = WorkoutHistoryItem::from_summary(player.playlist(), &summary);

    if let Err(e) = append_history(store, &item) {
        tracing::warn!(
            "Failed to record session for playlist {}: {}",
            item.playlist_id,
            e
        );
    }
    Some(item)
}

/// The `count` most recently completed sessions, newest first
pub fn recent_sessions(history: &[WorkoutHistoryItem], count: usize) -> Vec<WorkoutHistoryItem> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    sorted.truncate(count);
    sorted
}

/// Total time actually exercised, in seconds
pub fn total_actual_duration_sec(history: &[WorkoutHistoryItem]) -> u64 {
    history
        .iter()
        .map(|item| u64::from(item.actual_duration_sec))
        .sum()
}

/// Time exercised during the last `days` days (a rolling window ending at `now`)
pub fn total_actual_duration_sec_for_past_days(
    history: &[WorkoutHistoryItem],
    days: i64,
    now: DateTime<Utc>,
) -> u64 {
    let cutoff = now - Duration::days(days);
    history
        .iter()
        .filter(|item| item.completed_at >= cutoff)
        .map(|item| u64::from(item.actual_duration_sec))
        .sum()
}

/// Time exercised on the calendar day of `now`, in `now`'s time zone
pub fn today_actual_duration_sec<Tz: TimeZone>(
    history: &[WorkoutHistoryItem],
    now: &DateTime<Tz>,
) -> u64 {
    let today = now.date_naive();
    let tz = now.timezone();
    history
        .iter()
        .filter(|item| item.completed_at.with_timezone(&tz).date_naive() == today)
        .map(|item| u64::from(item.actual_duration_sec))
        .sum()
}
