//! Custom playlist persistence.
//!
//! Custom playlists are stored as one JSON array. Samples are filtered out
//! on both load and save, so a sample can never end up on disk.

use crate::samples::{find_sample, sample_playlists};
use crate::storage::{load_json_list, save_json_list, update_json_list, KeyValueStore};
use crate::{Error, Playlist, Result};

/// Storage key for the custom playlist list
pub const PLAYLISTS_KEY: &str = "custom_playlists_v1";

/// Load all custom playlists; storage problems yield an empty list
pub fn load_custom_playlists<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Playlist> {
    let playlists: Vec<Playlist> = load_json_list(store, PLAYLISTS_KEY);
    let total = playlists.len();
    let custom: Vec<Playlist> = playlists.into_iter().filter(|p| !p.is_sample).collect();
    if custom.len() != total {
        tracing::warn!(
            "Dropped {} sample playlist(s) found in storage",
            total - custom.len()
        );
    }
    custom
}

/// Replace the stored list with the custom playlists in `playlists`
pub fn save_custom_playlists<S: KeyValueStore + ?Sized>(
    store: &S,
    playlists: &[Playlist],
) -> Result<()> {
    let custom: Vec<&Playlist> = playlists.iter().filter(|p| !p.is_sample).collect();
    save_json_list(store, PLAYLISTS_KEY, custom.as_slice())?;
    tracing::debug!("Saved {} custom playlists", custom.len());
    Ok(())
}

/// Add a playlist, or replace the stored one with the same id
pub fn upsert_custom_playlist<S: KeyValueStore + ?Sized>(
    store: &S,
    playlist: &Playlist,
) -> Result<()> {
    if playlist.is_sample {
        return Err(Error::ReadOnlyPlaylist(playlist.id.clone()));
    }

    update_json_list(store, PLAYLISTS_KEY, |stored: &mut Vec<Playlist>| {
        stored.retain(|p| !p.is_sample);
        match stored.iter_mut().find(|p| p.id == playlist.id) {
            Some(slot) => *slot = playlist.clone(),
            None => stored.push(playlist.clone()),
        }
        Ok(true)
    })?;
    tracing::debug!("Saved custom playlist {}", playlist.id);
    Ok(())
}

/// Remove a custom playlist by id; returns whether anything was removed
pub fn delete_custom_playlist<S: KeyValueStore + ?Sized>(store: &S, id: &str) -> Result<bool> {
    if find_sample(id).is_some() {
        return Err(Error::ReadOnlyPlaylist(id.to_string()));
    }

    let mut removed = false;
    update_json_list(store, PLAYLISTS_KEY, |stored: &mut Vec<Playlist>| {
        let before = stored.len();
        stored.retain(|p| p.id != id);
        removed = stored.len() != before;
        stored.retain(|p| !p.is_sample);
        Ok(removed)
    })?;
    Ok(removed)
}

/// Samples first, then custom playlists with the most recently played first
pub fn all_playlists<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Playlist> {
    let mut custom = load_custom_playlists(store);
    custom.sort_by(|a, b| {
        let a_key = a.last_played_at.unwrap_or(a.updated_at);
        let b_key = b.last_played_at.unwrap_or(b.updated_at);
        b_key.cmp(&a_key)
    });

    sample_playlists().iter().cloned().chain(custom).collect()
}

/// Find a sample or custom playlist by id
pub fn find_playlist<S: KeyValueStore + ?Sized>(store: &S, id: &str) -> Result<Playlist> {
    if let Some(sample) = find_sample(id) {
        return Ok(sample.clone());
    }
    load_custom_playlists(store)
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::PlaylistNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::copy_as_custom;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{Duration, Utc};

    fn custom(name: &str) -> Playlist {
        let mut playlist = copy_as_custom(&sample_playlists()[0], Utc::now());
        playlist.name = name.into();
        playlist
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = MemoryStore::new();
        assert!(load_custom_playlists(&store).is_empty());
    }

    #[test]
    fn test_save_filters_samples() {
        let store = MemoryStore::new();
        let mine = custom("Mine");
        let all = vec![sample_playlists()[1].clone(), mine.clone()];

        save_custom_playlists(&store, &all).unwrap();
        let loaded = load_custom_playlists(&store);
        assert_eq!(loaded, vec![mine]);
    }

    #[test]
    fn test_load_filters_samples_written_elsewhere() {
        let store = MemoryStore::new();
        let raw = serde_json::to_string(&vec![sample_playlists()[0].clone(), custom("Mine")]).unwrap();
        store.set(PLAYLISTS_KEY, &raw).unwrap();

        let loaded = load_custom_playlists(&store);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Mine");
    }

    #[test]
    fn test_corrupted_file_loads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        std::fs::write(store.path_for(PLAYLISTS_KEY), "[{ broken").unwrap();
        assert!(load_custom_playlists(&store).is_empty());
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let store = MemoryStore::new();
        let mut playlist = custom("First");
        upsert_custom_playlist(&store, &playlist).unwrap();
        upsert_custom_playlist(&store, &custom("Second")).unwrap();

        playlist.name = "Renamed".into();
        upsert_custom_playlist(&store, &playlist).unwrap();

        let loaded = load_custom_playlists(&store);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Renamed");
    }

    #[test]
    fn test_upsert_rejects_sample() {
        let store = MemoryStore::new();
        let result = upsert_custom_playlist(&store, &sample_playlists()[0]);
        assert!(matches!(result, Err(Error::ReadOnlyPlaylist(_))));
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        let playlist = custom("Gone soon");
        upsert_custom_playlist(&store, &playlist).unwrap();

        assert!(delete_custom_playlist(&store, &playlist.id).unwrap());
        assert!(!delete_custom_playlist(&store, &playlist.id).unwrap());
        assert!(load_custom_playlists(&store).is_empty());
        assert!(delete_custom_playlist(&store, "sample-easy-5min").is_err());
    }

    #[test]
    fn test_concurrent_upserts_keep_every_playlist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    upsert_custom_playlist(&store, &custom(&format!("Thread {}", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(load_custom_playlists(&store).len(), 6);
    }

    #[test]
    fn test_all_playlists_orders_recently_played_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut older = custom("Older");
        older.updated_at = now - Duration::days(3);
        let mut played = custom("Played");
        played.updated_at = now - Duration::days(10);
        played.last_played_at = Some(now - Duration::hours(1));
        save_custom_playlists(&store, &[older, played]).unwrap();

        let all = all_playlists(&store);
        assert_eq!(all.len(), 5);
        assert!(all[..3].iter().all(|p| p.is_sample));
        assert_eq!(all[3].name, "Played");
        assert_eq!(all[4].name, "Older");
    }

    #[test]
    fn test_find_playlist() {
        let store = MemoryStore::new();
        let playlist = custom("Findable");
        upsert_custom_playlist(&store, &playlist).unwrap();

        assert_eq!(find_playlist(&store, &playlist.id).unwrap().name, "Findable");
        assert!(find_playlist(&store, "sample-run-12min").unwrap().is_sample);
        assert!(matches!(
            find_playlist(&store, "nope"),
            Err(Error::PlaylistNotFound(_))
        ));
    }
}
