//! Playlist editing operations.
//!
//! Every operation takes a playlist by reference and returns a new value with
//! phases recomputed and `updated_at` refreshed. Out-of-range arguments leave
//! the playlist untouched.

use crate::constraints::{DEFAULT_STEP_SEC, STEP_MAX_SEC, STEP_MIN_SEC};
use crate::types::new_step_id;
use crate::{ExerciseKind, Playlist, Step, StepPhase};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Kind of step to insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertKind {
    Exercise,
    Rest,
}

/// Insert a default 30-second step after `after_index`
///
/// `None` inserts at the front; indexes past the end append.
pub fn insert_step_after(
    playlist: &Playlist,
    after_index: Option<usize>,
    kind: InsertKind,
    now: DateTime<Utc>,
) -> Playlist {
    let step = match kind {
        InsertKind::Exercise => Step::exercise(ExerciseKind::Walking, DEFAULT_STEP_SEC),
        InsertKind::Rest => Step::rest(DEFAULT_STEP_SEC),
    };

    let mut steps = playlist.steps.clone();
    let insert_at = after_index.map_or(0, |i| i.saturating_add(1)).min(steps.len());
    steps.insert(insert_at, step);

    with_steps(playlist, steps, now)
}

/// Remove the step at `index`; the last remaining step is kept
pub fn remove_step_at(playlist: &Playlist, index: usize, now: DateTime<Utc>) -> Playlist {
    if playlist.steps.len() <= 1 || index >= playlist.steps.len() {
        return playlist.clone();
    }

    let mut steps = playlist.steps.clone();
    steps.remove(index);
    with_steps(playlist, steps, now)
}

/// Move the step at `from` so that it ends up at `to`
pub fn move_step(playlist: &Playlist, from: usize, to: usize, now: DateTime<Utc>) -> Playlist {
    let len = playlist.steps.len();
    if from >= len || to >= len || from == to {
        return playlist.clone();
    }

    let mut steps = playlist.steps.clone();
    let picked = steps.remove(from);
    steps.insert(to, picked);
    with_steps(playlist, steps, now)
}

/// Change a step's duration, refusing values outside the allowed step range
pub fn set_step_duration(
    playlist: &Playlist,
    index: usize,
    duration_sec: u32,
    now: DateTime<Utc>,
) -> Playlist {
    if index >= playlist.steps.len() || !(STEP_MIN_SEC..=STEP_MAX_SEC).contains(&duration_sec) {
        return playlist.clone();
    }

    let mut steps = playlist.steps.clone();
    steps[index].set_duration_sec(duration_sec);
    with_steps(playlist, steps, now)
}

/// Change which exercise an exercise step performs; rest steps are left alone
pub fn set_exercise_kind(
    playlist: &Playlist,
    index: usize,
    kind: ExerciseKind,
    now: DateTime<Utc>,
) -> Playlist {
    let mut steps = playlist.steps.clone();
    match steps.get_mut(index) {
        Some(Step::Exercise { exercise, .. }) => *exercise = kind,
        _ => return playlist.clone(),
    }
    with_steps(playlist, steps, now)
}

/// Rename a playlist; blank names are refused
pub fn rename(playlist: &Playlist, name: &str, now: DateTime<Utc>) -> Playlist {
    let name = name.trim();
    if name.is_empty() {
        return playlist.clone();
    }

    Playlist {
        name: name.to_string(),
        updated_at: now,
        ..playlist.clone()
    }
}

/// Recompute phase tags from step positions
///
/// The first exercise step is the warm-up, the last is the cool-down, and
/// any in between are plain exercise. Rest steps never carry a phase.
pub fn normalize_phases(steps: Vec<Step>) -> Vec<Step> {
    let exercise_positions: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| !step.is_rest())
        .map(|(i, _)| i)
        .collect();

    let (first, last) = match (exercise_positions.first(), exercise_positions.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return steps,
    };

    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| match step {
            Step::Exercise {
                id,
                duration_sec,
                exercise,
                ..
            } => {
                let phase = if i == first {
                    StepPhase::Warmup
                } else if i == last {
                    StepPhase::Cooldown
                } else {
                    StepPhase::Exercise
                };
                Step::Exercise {
                    id,
                    duration_sec,
                    exercise,
                    phase: Some(phase),
                }
            }
            rest => rest,
        })
        .collect()
}

/// Copy a template (usually a sample) into a new, editable custom playlist
///
/// The copy gets fresh playlist and step ids so it never collides with its
/// source.
pub fn copy_as_custom(template: &Playlist, now: DateTime<Utc>) -> Playlist {
    let steps = template
        .steps
        .iter()
        .cloned()
        .map(|mut step| {
            step.set_id(new_step_id());
            step
        })
        .collect();

    Playlist {
        id: format!("custom-{}", Uuid::new_v4()),
        name: format!("{} (custom)", template.name),
        steps: normalize_phases(steps),
        is_sample: false,
        created_at: now,
        updated_at: now,
        last_played_at: None,
    }
}

fn with_steps(playlist: &Playlist, steps: Vec<Step>, now: DateTime<Utc>) -> Playlist {
    Playlist {
        steps: normalize_phases(steps),
        updated_at: now,
        ..playlist.clone()
    }
}
