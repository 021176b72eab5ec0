//! Playlist player state machine.
//!
//! The player is a value. Each transition consumes the current state and
//! returns the next one; nothing is mutated in place and no timer runs
//! inside. The caller drives playback by calling [`PlayerState::tick`] with
//! the current wall-clock instant, roughly every half second.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            \          /
//!             Completed        (stop: any state -> Completed)
//! ```
//!
//! Time is counted from deltas between ticks, so late or irregular callbacks
//! lose nothing: a large delta simply walks across several steps at once.
//! Transitions requested from the wrong state return the input unchanged.

use crate::{CompletionSummary, Playlist, Step};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playback status; the last-tick instant only exists while running
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerStatus {
    Idle,
    Running { last_tick_at: DateTime<Utc> },
    Paused,
    Completed,
}

impl PlayerStatus {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerStatus::Idle => "idle",
            PlayerStatus::Running { .. } => "running",
            PlayerStatus::Paused => "paused",
            PlayerStatus::Completed => "completed",
        }
    }
}

/// In-progress playback of one playlist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    playlist: Playlist,
    status: PlayerStatus,
    current_step_index: usize,
    /// Time spent in the current step, in milliseconds
    step_elapsed_ms: u64,
    /// Time spent across the whole session, in milliseconds
    total_elapsed_ms: u64,
}

impl PlayerState {
    /// A fresh, idle player for `playlist`
    pub fn new(playlist: Playlist) -> Self {
        Self {
            playlist,
            status: PlayerStatus::Idle,
            current_step_index: 0,
            step_elapsed_ms: 0,
            total_elapsed_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, PlayerStatus::Running { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.status == PlayerStatus::Completed
    }

    pub fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PlayerStatus::Running { last_tick_at } => Some(last_tick_at),
            _ => None,
        }
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.playlist.steps.get(self.current_step_index)
    }

    pub fn step_elapsed_ms(&self) -> u64 {
        self.step_elapsed_ms
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.total_elapsed_ms
    }

    /// Whole seconds spent in the current step
    pub fn step_elapsed_sec(&self) -> u64 {
        self.step_elapsed_ms / 1000
    }

    /// Whole seconds spent in the session
    pub fn total_elapsed_sec(&self) -> u64 {
        self.total_elapsed_ms / 1000
    }

    /// Milliseconds left in the current step (0 once completed)
    pub fn step_remaining_ms(&self) -> u64 {
        if self.is_completed() {
            return 0;
        }
        self.current_step()
            .map(|s| s.duration_ms().saturating_sub(self.step_elapsed_ms))
            .unwrap_or(0)
    }

    /// Seconds left in the current step, rounded up for countdown display
    pub fn step_remaining_sec(&self) -> u64 {
        self.step_remaining_ms().div_ceil(1000)
    }

    /// 0.0 .. 1.0 progress within the current step
    pub fn step_progress(&self) -> f64 {
        let total = self.current_step().map(Step::duration_ms).unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        (self.step_elapsed_ms as f64 / total as f64).min(1.0)
    }

    /// Summary handed to history, available once playback has completed
    pub fn completion_summary(&self, completed_at: DateTime<Utc>) -> Option<CompletionSummary> {
        if !self.is_completed() {
            return None;
        }
        Some(CompletionSummary {
            total_duration_sec: self.playlist.total_duration_sec(),
            actual_duration_sec: u32::try_from(self.total_elapsed_sec()).unwrap_or(u32::MAX),
            completed_at,
        })
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Begin playback from the first step (idle only)
    pub fn start(self, now: DateTime<Utc>) -> Self {
        if self.status != PlayerStatus::Idle {
            return self;
        }

        Self {
            status: PlayerStatus::Running { last_tick_at: now },
            current_step_index: 0,
            step_elapsed_ms: 0,
            total_elapsed_ms: 0,
            ..self
        }
    }

    /// Stop accumulating time (running only)
    pub fn pause(self) -> Self {
        if !self.is_running() {
            return self;
        }

        Self {
            status: PlayerStatus::Paused,
            ..self
        }
    }

    /// Continue after a pause; time spent paused is not counted (paused only)
    pub fn resume(self, now: DateTime<Utc>) -> Self {
        if self.status != PlayerStatus::Paused {
            return self;
        }

        Self {
            status: PlayerStatus::Running { last_tick_at: now },
            ..self
        }
    }

    /// End the session early, from any state
    pub fn stop(self) -> Self {
        Self {
            status: PlayerStatus::Completed,
            ..self
        }
    }

    /// Advance by the wall-clock time since the previous tick (running only)
    pub fn tick(self, now: DateTime<Utc>) -> Self {
        let last_tick_at = match self.status {
            PlayerStatus::Running { last_tick_at } => last_tick_at,
            _ => return self,
        };

        let delta_ms = u64::try_from((now - last_tick_at).num_milliseconds()).unwrap_or(0);
        let mut step_elapsed_ms = self.step_elapsed_ms + delta_ms;
        let total_elapsed_ms = self.total_elapsed_ms + delta_ms;
        let mut index = self.current_step_index;
        let steps = &self.playlist.steps;

        while let Some(step) = steps.get(index) {
            let duration = step.duration_ms();
            if step_elapsed_ms < duration {
                break;
            }
            step_elapsed_ms -= duration;
            index += 1;
        }

        if index >= steps.len() {
            tracing::debug!(
                "Playlist {} completed after {} ms",
                self.playlist.id,
                total_elapsed_ms
            );
            let last_index = steps.len().saturating_sub(1);
            return Self {
                status: PlayerStatus::Completed,
                current_step_index: last_index,
                step_elapsed_ms: 0,
                total_elapsed_ms,
                ..self
            };
        }

        Self {
            status: PlayerStatus::Running { last_tick_at: now },
            current_step_index: index,
            step_elapsed_ms,
            total_elapsed_ms,
            ..self
        }
    }

    /// Jump to the start of the next step (running or paused)
    ///
    /// Skipping from the last step completes the session. Skipping while
    /// paused resumes playback.
    pub fn skip_to_next_step(self, now: DateTime<Utc>) -> Self {
        if !matches!(
            self.status,
            PlayerStatus::Running { .. } | PlayerStatus::Paused
        ) {
            return self;
        }

        let next = self.current_step_index + 1;
        if next >= self.playlist.steps.len() {
            return Self {
                status: PlayerStatus::Completed,
                step_elapsed_ms: 0,
                ..self
            };
        }

        Self {
            status: PlayerStatus::Running { last_tick_at: now },
            current_step_index: next,
            step_elapsed_ms: 0,
            ..self
        }
    }
}
