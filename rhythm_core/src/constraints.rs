//! Playlist and step limits. All durations are in seconds.

/// Maximum number of steps per playlist
pub const PLAYLIST_MAX_STEPS: usize = 12;

/// Minimum total playlist length (3 minutes)
pub const PLAYLIST_MIN_TOTAL_SEC: u64 = 180;

/// Maximum total playlist length (30 minutes)
pub const PLAYLIST_MAX_TOTAL_SEC: u64 = 1800;

/// Minimum duration of a single step
pub const STEP_MIN_SEC: u32 = 20;

/// Maximum duration of a single step
pub const STEP_MAX_SEC: u32 = 180;

/// Maximum number of running steps per playlist
pub const RUNNING_MAX_PER_PLAYLIST: usize = 1;

/// Duration given to freshly inserted steps
pub const DEFAULT_STEP_SEC: u32 = 30;
