//! Library facade
//!
//! Owns one of each container and keeps them in step. The catalog is the
//! source of truth: every mutation goes to the catalog first and is then
//! propagated to the playlist, the rating index and the favorites ranking so
//! that no container is left holding a stale copy.

use crate::catalog::Catalog;
use crate::cleaner::dedup_tracks;
use crate::config::TomlConfig;
use crate::dashboard::DashboardSnapshot;
use crate::error::{Error, Result};
use crate::favorites::Favorites;
use crate::history::History;
use crate::playlist::{Playlist, DEFAULT_PLAYLIST_NAME};
use crate::rating_index::RatingIndex;
use crate::snapshot::{self, ImportReport};
use crate::sorting::{SortAlgorithm, SortCriteria};
use crate::track::Track;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Library behind a single exclusive lock, for callers that share it
pub type SharedLibrary = Arc<Mutex<Library>>;

/// The five containers wired together
#[derive(Debug, Clone)]
pub struct Library {
    catalog: Catalog,
    playlist: Playlist,
    history: History,
    ratings: RatingIndex,
    favorites: Favorites,
}

impl Library {
    pub fn new(playlist_name: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            catalog: Catalog::new(),
            playlist: Playlist::new(playlist_name),
            history: History::with_capacity(history_capacity),
            ratings: RatingIndex::new(),
            favorites: Favorites::new(),
        }
    }

    pub fn from_config(config: &TomlConfig) -> Self {
        Self::new(config.playlist_name.clone(), config.history_capacity)
    }

    pub fn into_shared(self) -> SharedLibrary {
        Arc::new(Mutex::new(self))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Direct access for reordering (move, reverse, shuffle)
    pub fn playlist_mut(&mut self) -> &mut Playlist {
        &mut self.playlist
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rating_index(&self) -> &RatingIndex {
        &self.ratings
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Add a new track to the catalog, append it to the playlist and index
    /// its rating when it has one
    pub fn add_track(&mut self, track: Track) -> Result<()> {
        self.catalog.try_insert(track.clone())?;
        self.propagate_new(track);
        Ok(())
    }

    /// Remove a track from the catalog, the playlist (every occurrence), the
    /// rating index and the favorites ranking. The history keeps past plays.
    pub fn remove_track(&mut self, id: &str) -> Result<Track> {
        let track = self.catalog.try_delete(id)?;
        let from_playlist = self.playlist.remove_all_by_id(id);
        if track.is_rated() {
            self.ratings.remove(id, track.rating);
        }
        self.favorites.remove(&track);
        info!(track_id = %id, from_playlist, "Removed track from library");
        Ok(track)
    }

    /// Set a rating in the catalog and move the track to its new bucket
    pub fn rate_track(&mut self, id: &str, rating: u8) -> Result<Track> {
        let previous = self
            .catalog
            .find_by_id(id)
            .map(|track| track.rating)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.catalog.try_update_rating(id, rating)?;
        let updated = self.stored(id)?;

        if !self.ratings.move_track(id, previous, rating) {
            self.ratings.insert(updated.clone(), rating);
        }
        self.refresh_copies(&updated);
        debug!(track_id = %id, from = previous, to = rating, "Rated track");
        Ok(updated)
    }

    /// Replace a track's metadata everywhere it is held
    pub fn update_track(&mut self, track: Track) -> Result<()> {
        let previous = self.stored(&track.id)?;
        self.catalog.try_update(track.clone())?;

        if previous.is_rated() {
            self.ratings.remove(&previous.id, previous.rating);
        }
        if track.is_rated() {
            self.ratings.insert(track.clone(), track.rating);
        }
        self.refresh_copies(&track);
        debug!(track_id = %track.id, "Updated track");
        Ok(())
    }

    /// Record a playback of a catalog track.
    ///
    /// `listened_secs` defaults to the full track duration.
    pub fn play(&mut self, id: &str, listened_secs: Option<u64>) -> Result<Track> {
        let track = self.stored(id)?;
        let listened = listened_secs.unwrap_or_else(|| u64::from(track.duration_secs));
        self.history.push(track.clone());
        self.favorites.auto_update_from_playback(&track, listened);
        info!(track_id = %id, listened_secs = listened, "Played track");
        Ok(track)
    }

    /// Pop the most recent play. Favorites counters are not rolled back.
    pub fn undo_last_play(&mut self) -> Option<Track> {
        self.history.pop()
    }

    /// Fold the whole history into the favorites ranking, estimating one
    /// full listen per play
    pub fn sync_favorites_from_history(&mut self) {
        let plays: Vec<Track> = self.history.iter_chronological().cloned().collect();
        self.favorites.sync_from_playback_log(&plays);
    }

    pub fn sort_playlist(&mut self, criteria: SortCriteria, algorithm: SortAlgorithm) {
        self.playlist.sort_by(criteria, algorithm);
        info!(criteria = %criteria, algorithm = ?algorithm, "Sorted playlist");
    }

    /// Drop repeated title + artist entries from the playlist, keeping the
    /// first of each. Returns how many were removed.
    pub fn dedupe_playlist(&mut self) -> usize {
        let tracks = self.playlist.to_vec();
        let kept = dedup_tracks(&tracks);
        let removed = tracks.len() - kept.len();
        if removed > 0 {
            self.playlist.clear();
            self.playlist.extend(kept);
        }
        removed
    }

    /// Rebuild the rating tree into a balanced shape
    pub fn rebalance_ratings(&mut self) {
        self.ratings.rebalance();
    }

    pub fn export_catalog(&self, path: &Path) -> Result<()> {
        snapshot::export_catalog_to_path(&self.catalog, path)
    }

    /// Import a catalog snapshot; accepted tracks also join the playlist and
    /// the rating index
    pub fn import_catalog(&mut self, path: &Path) -> Result<ImportReport> {
        let report = snapshot::import_catalog_from_path(&mut self.catalog, path)?;
        for id in &report.imported {
            if let Some(track) = self.catalog.find_by_id(id).cloned() {
                self.propagate_new(track);
            }
        }
        Ok(report)
    }

    pub fn export_history(&self, path: &Path) -> Result<()> {
        snapshot::export_history_to_path(&self.history, path)
    }

    pub fn import_history(&mut self, path: &Path) -> Result<ImportReport> {
        snapshot::import_history_from_path(&mut self.history, path)
    }

    /// Write the current dashboard as a text report
    pub fn export_report(&self, path: &Path) -> Result<()> {
        DashboardSnapshot::capture(self).export_to_path(path)
    }

    /// Load the demo tracks and play the first three. Tracks already in the
    /// catalog are skipped. Returns how many were added.
    pub fn load_sample_data(&mut self) -> usize {
        let mut added = 0;
        for track in sample_tracks() {
            let id = track.id.clone();
            match self.add_track(track) {
                Ok(()) => added += 1,
                Err(err) => warn!(track_id = %id, error = %err, "Skipped sample track"),
            }
        }
        for id in ["song_001", "song_002", "song_003"] {
            if let Err(err) = self.play(id, None) {
                warn!(track_id = %id, error = %err, "Skipped sample play");
            }
        }
        info!(added, "Loaded sample data");
        added
    }

    fn stored(&self, id: &str) -> Result<Track> {
        self.catalog
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn propagate_new(&mut self, track: Track) {
        if track.is_rated() {
            self.ratings.insert(track.clone(), track.rating);
        }
        debug!(track_id = %track.id, playlist_size = self.playlist.len() + 1, "Added track to library");
        self.playlist.push_back(track);
    }

    fn refresh_copies(&mut self, track: &Track) {
        self.playlist.refresh(track);
        self.favorites.refresh(track);
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_NAME, crate::history::DEFAULT_HISTORY_CAPACITY)
    }
}

fn sample_tracks() -> Vec<Track> {
    vec![
        Track::new("song_001", "Bohemian Rhapsody", "Queen", 354)
            .with_rating(5)
            .with_album("A Night at the Opera")
            .with_genre("Rock"),
        Track::new("song_002", "Hotel California", "Eagles", 391)
            .with_rating(4)
            .with_album("Hotel California")
            .with_genre("Rock"),
        Track::new("song_003", "Imagine", "John Lennon", 183)
            .with_rating(5)
            .with_album("Imagine")
            .with_genre("Pop"),
        Track::new("song_004", "Stairway to Heaven", "Led Zeppelin", 482)
            .with_rating(5)
            .with_album("Led Zeppelin IV")
            .with_genre("Rock"),
        Track::new("song_005", "Yesterday", "The Beatles", 125)
            .with_rating(4)
            .with_album("Help!")
            .with_genre("Pop"),
        Track::new("song_006", "Hey Jude", "The Beatles", 431)
            .with_rating(5)
            .with_album("The Beatles 1967-1970")
            .with_genre("Pop"),
        Track::new("song_007", "Sweet Child O' Mine", "Guns N' Roses", 356)
            .with_rating(3)
            .with_album("Appetite for Destruction")
            .with_genre("Rock"),
    ]
}
