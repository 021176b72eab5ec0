//! Built-in sample playlists.
//!
//! Samples are read-only templates: they are offered for playback and for
//! copying, but never written to storage.

use crate::edit::normalize_phases;
use crate::types::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

/// Cached samples - built once and reused across all operations
static SAMPLE_PLAYLISTS: Lazy<Vec<Playlist>> = Lazy::new(build_sample_playlists);

/// All built-in samples, in display order
pub fn sample_playlists() -> &'static [Playlist] {
    &SAMPLE_PLAYLISTS
}

/// Look up a sample by id
pub fn find_sample(id: &str) -> Option<&'static Playlist> {
    SAMPLE_PLAYLISTS.iter().find(|p| p.id == id)
}

fn exercise(id: &str, kind: ExerciseKind, duration_sec: u32) -> Step {
    Step::Exercise {
        id: id.into(),
        duration_sec,
        exercise: kind,
        phase: None,
    }
}

fn rest(id: &str, duration_sec: u32) -> Step {
    Step::Rest {
        id: id.into(),
        duration_sec,
    }
}

fn sample(id: &str, name: &str, steps: Vec<Step>) -> Playlist {
    // 2024-01-01T00:00:00Z, fixed so samples compare equal across runs
    let created = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default();
    Playlist {
        id: id.into(),
        name: name.into(),
        steps: normalize_phases(steps),
        is_sample: true,
        created_at: created,
        updated_at: created,
        last_played_at: None,
    }
}

fn build_sample_playlists() -> Vec<Playlist> {
    use ExerciseKind::*;

    vec![
        // A very light wake-up for the first day
        sample(
            "sample-easy-5min",
            "First-day 5-minute routine",
            vec![
                exercise("easy-1", Walking, 90),
                rest("easy-2", 30),
                exercise("easy-3", Squats, 60),
                rest("easy-4", 30),
                exercise("easy-5", JumpingJacks, 60),
            ],
        ),
        sample(
            "sample-full-10min",
            "Full-body 10-minute routine",
            vec![
                exercise("full-1", JumpingJacks, 60),
                rest("full-2", 30),
                exercise("full-3", Squats, 90),
                rest("full-4", 30),
                exercise("full-5", PushUps, 60),
                rest("full-6", 30),
                exercise("full-7", MountainClimbers, 90),
            ],
        ),
        // Running appears once, within the per-playlist limit
        sample(
            "sample-run-12min",
            "Walk + run 12 minutes",
            vec![
                exercise("run-1", Walking, 120),
                rest("run-2", 30),
                exercise("run-3", Running, 120),
                rest("run-4", 60),
                exercise("run-5", Squats, 60),
                rest("run-6", 30),
                exercise("run-7", Walking, 120),
            ],
        ),
    ]
}
