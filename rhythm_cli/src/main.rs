use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rhythm_core::edit::{self, InsertKind};
use rhythm_core::history::{
    clear_history, load_history, recent_sessions, record_completion, today_actual_duration_sec,
    total_actual_duration_sec, total_actual_duration_sec_for_past_days,
};
use rhythm_core::playlists::{
    all_playlists, delete_custom_playlist, find_playlist, load_custom_playlists,
    upsert_custom_playlist,
};
use rhythm_core::samples::find_sample;
use rhythm_core::validate::violation_codes;
use rhythm_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "rhythm")]
#[command(about = "Timed workout playlists in your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's activity and a message from your partner (default)
    Home,

    /// List sample and custom playlists
    List,

    /// Show the steps of a playlist
    Show { id: String },

    /// Check a playlist against the playlist limits
    Validate { id: String },

    /// Create a custom playlist by copying an existing one
    New {
        /// Playlist to copy (sample or custom)
        #[arg(long)]
        from: String,

        /// Name for the copy
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename a custom playlist
    Rename { id: String, name: String },

    /// Delete a custom playlist
    Delete { id: String },

    /// Edit the steps of a custom playlist (step numbers start at 1)
    Step {
        id: String,

        #[command(subcommand)]
        action: StepAction,
    },

    /// Play a playlist
    Play {
        id: String,

        /// Auto-complete (for testing) - finish instantly and record the session
        #[arg(long)]
        auto_complete: bool,
    },

    /// Show workout history
    History {
        /// Delete all recorded workouts
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum StepAction {
    /// Insert a 30-second step after step N (at the front if omitted)
    Insert {
        #[arg(long, value_enum)]
        kind: StepKindArg,

        #[arg(long)]
        after: Option<usize>,
    },

    /// Remove step N
    Remove { step: usize },

    /// Move step FROM to position TO
    Move { from: usize, to: usize },

    /// Set the duration of step N in seconds
    Duration { step: usize, seconds: u32 },

    /// Set the exercise of step N (e.g. squats, push-ups, running)
    Exercise { step: usize, kind: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum StepKindArg {
    Exercise,
    Rest,
}

fn main() -> Result<()> {
    // Initialize logging
    rhythm_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let store = FileStore::new(data_dir);

    match cli.command {
        Some(Commands::Home) | None => cmd_home(&store, &config),
        Some(Commands::List) => cmd_list(&store),
        Some(Commands::Show { id }) => cmd_show(&store, &id),
        Some(Commands::Validate { id }) => cmd_validate(&store, &id),
        Some(Commands::New { from, name }) => cmd_new(&store, &from, name.as_deref()),
        Some(Commands::Rename { id, name }) => cmd_rename(&store, &id, &name),
        Some(Commands::Delete { id }) => cmd_delete(&store, &id),
        Some(Commands::Step { id, action }) => cmd_step(&store, &id, action),
        Some(Commands::Play { id, auto_complete }) => {
            cmd_play(&store, &id, auto_complete, &config)
        }
        Some(Commands::History { clear }) => cmd_history(&store, clear, &config),
    }
}

fn cmd_home(store: &FileStore, config: &Config) -> Result<()> {
    let history = load_history(store);
    let now = Local::now();
    let today_sec = today_actual_duration_sec(&history, &now);
    let recent = recent_sessions(&history, config.home.recent_sessions);

    let mood = character_mood(today_sec, recent.len());
    let message = character_message(&MessageContext {
        today_total_sec: today_sec,
        recent_sessions: &recent,
        now,
    });

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", mood_face(mood));
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", message);
    println!();
    println!("  Today: {}", format_duration(today_sec));

    if !recent.is_empty() {
        println!();
        println!("  Recent:");
        for item in &recent {
            println!(
                "  → {}  {} ({})",
                item.completed_at.with_timezone(&Local).format("%m-%d %H:%M"),
                item.playlist_name,
                format_duration(u64::from(item.actual_duration_sec))
            );
        }
    }
    println!();

    Ok(())
}

fn cmd_list(store: &FileStore) -> Result<()> {
    for playlist in all_playlists(store) {
        let tag = if playlist.is_sample { " [sample]" } else { "" };
        println!(
            "{:<44} {}{}  ({} steps, {})",
            playlist.id,
            playlist.name,
            tag,
            playlist.steps.len(),
            format_duration(playlist.total_duration_sec())
        );
    }
    Ok(())
}

fn cmd_show(store: &FileStore, id: &str) -> Result<()> {
    let playlist = find_playlist(store, id)?;

    println!("\n  {}", playlist.name);
    println!("  id: {}{}", playlist.id, if playlist.is_sample { " (sample, read-only)" } else { "" });
    println!();
    for (i, step) in playlist.steps.iter().enumerate() {
        let phase = step.phase().map(|p| format!(" [{}]", p.label())).unwrap_or_default();
        println!(
            "  {:>2}. {:<18} {:>4}s{}",
            i + 1,
            step.label(),
            step.duration_sec(),
            phase
        );
    }
    println!();
    println!(
        "  Total: {}",
        format_duration(playlist.total_duration_sec())
    );

    let violations = validate_playlist(&playlist);
    if !violations.is_empty() {
        println!();
        print_violations("Violations:", &violations);
    }
    println!();

    Ok(())
}

fn cmd_validate(store: &FileStore, id: &str) -> Result<()> {
    let playlist = find_playlist(store, id)?;
    let violations = validate_playlist(&playlist);
    if violations.is_empty() {
        println!("✓ {} is valid", playlist.name);
        return Ok(());
    }

    print_violations("Violations:", &violations);
    Err(Error::InvalidPlaylist(violation_codes(&violations)))
}

fn cmd_new(store: &FileStore, from: &str, name: Option<&str>) -> Result<()> {
    let template = find_playlist(store, from)?;
    let now = Utc::now();

    let mut playlist = edit::copy_as_custom(&template, now);
    if let Some(name) = name {
        playlist = edit::rename(&playlist, name, now);
    }

    save_if_valid(store, &playlist)?;
    println!("✓ Created \"{}\"", playlist.name);
    println!("  id: {}", playlist.id);
    Ok(())
}

fn cmd_rename(store: &FileStore, id: &str, name: &str) -> Result<()> {
    let playlist = load_editable(store, id)?;
    let renamed = edit::rename(&playlist, name, Utc::now());
    if renamed == playlist {
        return Err(Error::Other("Playlist name cannot be empty".into()));
    }

    save_if_valid(store, &renamed)?;
    println!("✓ Renamed to \"{}\"", renamed.name);
    Ok(())
}

fn cmd_delete(store: &FileStore, id: &str) -> Result<()> {
    if delete_custom_playlist(store, id)? {
        println!("✓ Deleted {}", id);
        Ok(())
    } else {
        Err(Error::PlaylistNotFound(id.to_string()))
    }
}

fn cmd_step(store: &FileStore, id: &str, action: StepAction) -> Result<()> {
    let playlist = load_editable(store, id)?;
    let now = Utc::now();

    let edited = match action {
        StepAction::Insert { kind, after } => {
            let kind = match kind {
                StepKindArg::Exercise => InsertKind::Exercise,
                StepKindArg::Rest => InsertKind::Rest,
            };
            // "after 0" and no --after both mean the front
            let after_index = after.and_then(|n| n.checked_sub(1));
            edit::insert_step_after(&playlist, after_index, kind, now)
        }
        StepAction::Remove { step } => match step_index(step) {
            Some(index) => edit::remove_step_at(&playlist, index, now),
            None => playlist.clone(),
        },
        StepAction::Move { from, to } => match (step_index(from), step_index(to)) {
            (Some(from), Some(to)) => edit::move_step(&playlist, from, to, now),
            _ => playlist.clone(),
        },
        StepAction::Duration { step, seconds } => match step_index(step) {
            Some(index) => edit::set_step_duration(&playlist, index, seconds, now),
            None => playlist.clone(),
        },
        StepAction::Exercise { step, kind } => {
            let kind: ExerciseKind = kind.parse()?;
            match step_index(step) {
                Some(index) => edit::set_exercise_kind(&playlist, index, kind, now),
                None => playlist.clone(),
            }
        }
    };

    if edited == playlist {
        return Err(Error::Other(
            "Nothing changed; check the step number and the allowed step range".into(),
        ));
    }

    save_if_valid(store, &edited)?;
    println!("✓ Updated \"{}\"", edited.name);
    Ok(())
}

fn cmd_play(store: &FileStore, id: &str, auto_complete: bool, config: &Config) -> Result<()> {
    let playlist = find_playlist(store, id)?;

    let violations = validate_playlist(&playlist);
    if !violations.is_empty() {
        tracing::warn!(
            "Playing {} despite violations: {}",
            playlist.id,
            violation_codes(&violations).join(", ")
        );
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ▶ {}", playlist.name);
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  {} steps, {}",
        playlist.steps.len(),
        format_duration(playlist.total_duration_sec())
    );

    let started_at = Utc::now();
    let player = PlayerState::new(playlist.clone()).start(started_at);

    let (finished, completed_at) = if auto_complete {
        let planned_ms = i64::try_from(playlist.total_duration_ms()).unwrap_or(i64::MAX);
        let end = started_at
            .checked_add_signed(chrono::Duration::milliseconds(planned_ms))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (player.tick(end), end)
    } else {
        let finished = run_player(player, config.player.tick_interval_ms)?;
        (finished, Utc::now())
    };

    let Some(item) = record_completion(store, &finished, completed_at) else {
        return Ok(());
    };

    if !playlist.is_sample {
        let played = Playlist {
            last_played_at: Some(completed_at),
            ..playlist
        };
        if let Err(e) = upsert_custom_playlist(store, &played) {
            tracing::warn!("Failed to update last played time for {}: {}", played.id, e);
        }
    }

    println!("\n✓ Workout complete!");
    println!(
        "  Time: {} of {} planned",
        format_duration(u64::from(item.actual_duration_sec)),
        format_duration(item.total_duration_sec)
    );
    Ok(())
}

fn cmd_history(store: &FileStore, clear: bool, config: &Config) -> Result<()> {
    if clear {
        clear_history(store)?;
        println!("✓ History cleared");
        return Ok(());
    }

    let history = load_history(store);
    if history.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }

    for item in recent_sessions(&history, history.len()) {
        println!(
            "{}  {:<32} {} / {}",
            item.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            item.playlist_name,
            format_duration(u64::from(item.actual_duration_sec)),
            format_duration(item.total_duration_sec)
        );
    }

    let days = config.history.summary_days;
    println!();
    println!(
        "Last {} days: {}",
        days,
        format_duration(total_actual_duration_sec_for_past_days(&history, days, Utc::now()))
    );
    println!(
        "All time: {} in {} workouts",
        format_duration(total_actual_duration_sec(&history)),
        history.len()
    );
    Ok(())
}

/// Drive the player from the terminal until it completes
///
/// Ticks every `tick_interval_ms`; lines typed on stdin control playback.
fn run_player(mut player: PlayerState, tick_interval_ms: u64) -> Result<PlayerState> {
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("  Enter: pause/resume   n: next step   s: stop");
    let interval = StdDuration::from_millis(tick_interval_ms);
    let mut input_open = true;
    let mut shown: Option<(usize, &'static str)> = None;

    while !player.is_completed() {
        if input_open {
            match rx.recv_timeout(interval) {
                Ok(line) => player = apply_control(player, line.trim()),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => input_open = false,
            }
        } else {
            std::thread::sleep(interval);
        }

        player = player.tick(Utc::now());
        report_progress(&player, &mut shown)?;
    }
    println!();

    Ok(player)
}

fn apply_control(player: PlayerState, input: &str) -> PlayerState {
    let now = Utc::now();
    match input.to_lowercase().as_str() {
        "" => match player.status() {
            PlayerStatus::Paused => player.resume(now),
            _ => player.pause(),
        },
        "p" => player.pause(),
        "r" => player.resume(now),
        "n" => player.skip_to_next_step(now),
        "s" | "q" => player.stop(),
        other => {
            println!("\n  Unknown command {:?}", other);
            player
        }
    }
}

fn report_progress(player: &PlayerState, shown: &mut Option<(usize, &'static str)>) -> Result<()> {
    if player.is_completed() {
        return Ok(());
    }

    let current = (player.current_step_index(), player.status().name());
    if *shown != Some(current) {
        if let Some(step) = player.current_step() {
            let paused = if player.status() == PlayerStatus::Paused { " (paused)" } else { "" };
            println!(
                "\n  Step {}/{}: {}{}",
                current.0 + 1,
                player.playlist().steps.len(),
                step.label(),
                paused
            );
        }
        *shown = Some(current);
    }

    print!("\r  {:>4}s left ", player.step_remaining_sec());
    io::stdout().flush()?;
    Ok(())
}

/// Fetch a custom playlist for editing; samples are read-only
fn load_editable(store: &FileStore, id: &str) -> Result<Playlist> {
    if find_sample(id).is_some() {
        return Err(Error::ReadOnlyPlaylist(id.to_string()));
    }
    load_custom_playlists(store)
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::PlaylistNotFound(id.to_string()))
}

/// Persist a custom playlist only if it passes validation
fn save_if_valid(store: &FileStore, playlist: &Playlist) -> Result<()> {
    let violations = validate_playlist(playlist);
    if !violations.is_empty() {
        print_violations("Playlist cannot be saved:", &violations);
        return Err(Error::InvalidPlaylist(violation_codes(&violations)));
    }
    upsert_custom_playlist(store, playlist)
}

fn print_violations(header: &str, violations: &[Violation]) {
    eprintln!("{}", header);
    for violation in violations {
        eprintln!("  - [{}] {}", violation.code, violation.message);
    }
}

/// 1-based step number to index
fn step_index(step: usize) -> Option<usize> {
    step.checked_sub(1)
}

fn mood_face(mood: CharacterMood) -> &'static str {
    match mood {
        CharacterMood::Idle => "(-_-)  resting",
        CharacterMood::Gentle => "(^_^)  warming up",
        CharacterMood::Positive => "(^o^)/ great day",
    }
}

fn format_duration(total_sec: u64) -> String {
    let minutes = total_sec / 60;
    let seconds = total_sec % 60;
    if minutes == 0 {
        format!("{}s", seconds)
    } else if seconds == 0 {
        format!("{}m", minutes)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
