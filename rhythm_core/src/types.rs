//! Core domain types for Rhythm.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise kinds and step phases
//! - Playlist steps and playlists
//! - Completed-session summaries and history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Kind of exercise performed in an exercise step
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    JumpingJacks,
    MountainClimbers,
    Burpees,
    Squats,
    PushUps,
    Running,
    Walking,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 7] = [
        ExerciseKind::JumpingJacks,
        ExerciseKind::MountainClimbers,
        ExerciseKind::Burpees,
        ExerciseKind::Squats,
        ExerciseKind::PushUps,
        ExerciseKind::Running,
        ExerciseKind::Walking,
    ];

    /// Stable kebab-case identifier, as stored on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::JumpingJacks => "jumping-jacks",
            ExerciseKind::MountainClimbers => "mountain-climbers",
            ExerciseKind::Burpees => "burpees",
            ExerciseKind::Squats => "squats",
            ExerciseKind::PushUps => "push-ups",
            ExerciseKind::Running => "running",
            ExerciseKind::Walking => "walking",
        }
    }

    /// Human-readable name shown while playing
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseKind::JumpingJacks => "Jumping jacks",
            ExerciseKind::MountainClimbers => "Mountain climbers",
            ExerciseKind::Burpees => "Burpees",
            ExerciseKind::Squats => "Squats",
            ExerciseKind::PushUps => "Push-ups",
            ExerciseKind::Running => "Running",
            ExerciseKind::Walking => "Walking",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExerciseKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| crate::Error::Other(format!("Unknown exercise kind: {}", s)))
    }
}

/// Role of an exercise step within its playlist (derived, never authoritative)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Warmup,
    Exercise,
    Cooldown,
}

impl StepPhase {
    pub fn label(&self) -> &'static str {
        match self {
            StepPhase::Warmup => "Warm-up",
            StepPhase::Exercise => "Exercise",
            StepPhase::Cooldown => "Cool-down",
        }
    }
}

// ============================================================================
// Steps and Playlists
// ============================================================================

/// One timed unit of a playlist
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Exercise {
        id: String,
        duration_sec: u32,
        exercise: ExerciseKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<StepPhase>,
    },
    Rest {
        id: String,
        duration_sec: u32,
    },
}

impl Step {
    pub fn exercise(kind: ExerciseKind, duration_sec: u32) -> Self {
        Step::Exercise {
            id: new_step_id(),
            duration_sec,
            exercise: kind,
            phase: None,
        }
    }

    pub fn rest(duration_sec: u32) -> Self {
        Step::Rest {
            id: new_step_id(),
            duration_sec,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Step::Exercise { id, .. } | Step::Rest { id, .. } => id,
        }
    }

    pub fn duration_sec(&self) -> u32 {
        match self {
            Step::Exercise { duration_sec, .. } | Step::Rest { duration_sec, .. } => *duration_sec,
        }
    }

    /// Duration in milliseconds, the unit the player counts in
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_sec()) * 1000
    }

    /// Exercise kind, or None for rest steps
    pub fn exercise_kind(&self) -> Option<ExerciseKind> {
        match self {
            Step::Exercise { exercise, .. } => Some(*exercise),
            Step::Rest { .. } => None,
        }
    }

    pub fn phase(&self) -> Option<StepPhase> {
        match self {
            Step::Exercise { phase, .. } => *phase,
            Step::Rest { .. } => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Step::Rest { .. })
    }

    /// Display name: the exercise label, or "Rest"
    pub fn label(&self) -> &'static str {
        match self {
            Step::Exercise { exercise, .. } => exercise.label(),
            Step::Rest { .. } => "Rest",
        }
    }

    pub(crate) fn set_id(&mut self, new_id: String) {
        match self {
            Step::Exercise { id, .. } | Step::Rest { id, .. } => *id = new_id,
        }
    }

    pub(crate) fn set_duration_sec(&mut self, value: u32) {
        match self {
            Step::Exercise { duration_sec, .. } | Step::Rest { duration_sec, .. } => {
                *duration_sec = value
            }
        }
    }
}

pub(crate) fn new_step_id() -> String {
    format!("step-{}", Uuid::new_v4())
}

/// A named, ordered sequence of steps forming one workout routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub steps: Vec<Step>,
    /// Built-in, read-only template; never persisted
    #[serde(default)]
    pub is_sample: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<DateTime<Utc>>,
}

impl Playlist {
    /// An empty custom playlist
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.into(),
            steps: Vec::new(),
            is_sample: false,
            created_at: now,
            updated_at: now,
            last_played_at: None,
        }
    }

    /// Planned length: the sum of all step durations
    ///
    /// Summed in `u64`: stored steps may carry any `u32` duration.
    pub fn total_duration_sec(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_sec())).sum()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.duration_ms()))
    }
}

// ============================================================================
// Completion and History Types
// ============================================================================

/// What the player hands back when a session ends
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionSummary {
    pub total_duration_sec: u64,
    pub actual_duration_sec: u32,
    pub completed_at: DateTime<Utc>,
}

/// A completed workout, appended to history and never mutated
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutHistoryItem {
    pub id: Uuid,
    pub playlist_id: String,
    pub playlist_name: String,
    pub total_duration_sec: u64,
    pub actual_duration_sec: u32,
    pub completed_at: DateTime<Utc>,
}

impl WorkoutHistoryItem {
    /// Snapshot the playlist's id and name alongside the session summary
    pub fn from_summary(playlist: &Playlist, summary: &CompletionSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            playlist_id: playlist.id.clone(),
            playlist_name: playlist.name.clone(),
            total_duration_sec: summary.total_duration_sec,
            actual_duration_sec: summary.actual_duration_sec,
            completed_at: summary.completed_at,
        }
    }
}
