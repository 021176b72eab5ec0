//! Playlist validation.
//!
//! Validation is the gate in front of saving a custom playlist. The player
//! never enforces these rules itself.

use crate::constraints::*;
use crate::{ExerciseKind, Playlist};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable violation code
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    EmptyPlaylist,
    TooManySteps,
    TooShort,
    TooLong,
    StepDurationInvalid,
    TooManyRunning,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::EmptyPlaylist => "EMPTY_PLAYLIST",
            ViolationCode::TooManySteps => "TOO_MANY_STEPS",
            ViolationCode::TooShort => "TOO_SHORT",
            ViolationCode::TooLong => "TOO_LONG",
            ViolationCode::StepDurationInvalid => "STEP_DURATION_INVALID",
            ViolationCode::TooManyRunning => "TOO_MANY_RUNNING",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed check, with a message suitable for showing to the user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
}

impl Violation {
    fn new(code: ViolationCode, message: String) -> Self {
        Self { code, message }
    }
}

/// Sum of all step durations in seconds
pub fn total_duration_sec(playlist: &Playlist) -> u64 {
    playlist.total_duration_sec()
}

/// Number of exercise steps whose kind is running
pub fn count_running_steps(playlist: &Playlist) -> usize {
    playlist
        .steps
        .iter()
        .filter(|step| step.exercise_kind() == Some(ExerciseKind::Running))
        .count()
}

/// Check a playlist against the limits in [`crate::constraints`]
///
/// Returns every violation found, in check order; an empty list means the
/// playlist may be saved. An empty playlist reports only `EMPTY_PLAYLIST`.
pub fn validate_playlist(playlist: &Playlist) -> Vec<Violation> {
    let mut violations = Vec::new();

    if playlist.steps.is_empty() {
        violations.push(Violation::new(
            ViolationCode::EmptyPlaylist,
            "Add at least one exercise to your playlist.".into(),
        ));
        return violations;
    }

    if playlist.steps.len() > PLAYLIST_MAX_STEPS {
        violations.push(Violation::new(
            ViolationCode::TooManySteps,
            format!("A playlist can hold at most {} steps.", PLAYLIST_MAX_STEPS),
        ));
    }

    let total = total_duration_sec(playlist);
    if total < PLAYLIST_MIN_TOTAL_SEC {
        violations.push(Violation::new(
            ViolationCode::TooShort,
            format!(
                "A playlist should last at least {} minutes.",
                PLAYLIST_MIN_TOTAL_SEC / 60
            ),
        ));
    }

    if total > PLAYLIST_MAX_TOTAL_SEC {
        violations.push(Violation::new(
            ViolationCode::TooLong,
            format!(
                "A playlist can last at most {} minutes.",
                PLAYLIST_MAX_TOTAL_SEC / 60
            ),
        ));
    }

    let has_invalid_step = playlist
        .steps
        .iter()
        .any(|step| !(STEP_MIN_SEC..=STEP_MAX_SEC).contains(&step.duration_sec()));
    if has_invalid_step {
        violations.push(Violation::new(
            ViolationCode::StepDurationInvalid,
            format!(
                "Each step should last between {} and {} seconds.",
                STEP_MIN_SEC, STEP_MAX_SEC
            ),
        ));
    }

    if count_running_steps(playlist) > RUNNING_MAX_PER_PLAYLIST {
        violations.push(Violation::new(
            ViolationCode::TooManyRunning,
            format!(
                "A playlist can include running at most {} time.",
                RUNNING_MAX_PER_PLAYLIST
            ),
        ));
    }

    violations
}

/// Codes only, for compact reporting
pub fn violation_codes(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.code.to_string()).collect()
}
