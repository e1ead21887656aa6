//! Favorites ranking
//!
//! Per-track listening counters keyed by the normalized title + artist, and a
//! ranking derived from them: listening time descending, then play count
//! descending, then title, artist and key ascending.
//!
//! Every mutating call marks the ranking dirty and re-sorts before returning.
//! [`Favorites::batch`] applies many counter changes and sorts once.

use crate::track::{CompositeKey, Track};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// A tracked track and its counters
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteEntry {
    pub track: Track,
    /// Accumulated listening time in seconds
    pub listening_secs: u64,
    pub play_count: u32,
}

impl FavoriteEntry {
    fn new(track: Track) -> Self {
        Self {
            track,
            listening_secs: 0,
            play_count: 0,
        }
    }
}

/// Summary numbers for the dashboard and the shell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoritesStats {
    pub tracked: usize,
    pub total_listening_secs: u64,
    pub average_listening_secs: f64,
    pub total_plays: u64,
}

/// Listening-time ranking of tracks
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    entries: HashMap<CompositeKey, FavoriteEntry>,
    /// Keys in rank order; valid only when `dirty` is false
    ranking: Vec<CompositeKey>,
    dirty: bool,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a track with zero counters.
    /// Returns false if it is already tracked or invalid.
    pub fn add(&mut self, track: Track) -> bool {
        let added = self.apply_add(track);
        self.reconcile();
        added
    }

    /// Stop tracking a track and drop its counters
    pub fn remove(&mut self, track: &Track) -> bool {
        let key = track.composite_key();
        if self.entries.remove(&key).is_none() {
            return false;
        }
        self.ranking.retain(|k| *k != key);
        debug!(op = "remove", track_id = %track.id, size = self.entries.len(), "Favorites remove");
        true
    }

    /// Add listening time, tracking the song first if needed
    pub fn update_listening_time(&mut self, track: &Track, delta_secs: u64) {
        self.apply_listening_time(track, delta_secs);
        self.reconcile();
    }

    /// Count one more play, tracking the song first if needed
    pub fn increment_play_count(&mut self, track: &Track) {
        self.apply_play(track, 0, 1);
        self.reconcile();
    }

    /// Record a single playback: listening time plus one play
    pub fn auto_update_from_playback(&mut self, track: &Track, listened_secs: u64) {
        self.apply_play(track, listened_secs, 1);
        self.reconcile();
    }

    /// Fold a playback log into the counters.
    ///
    /// Each distinct song gains `occurrences` plays and an estimated
    /// `duration * occurrences` seconds of listening.
    pub fn sync_from_playback_log<'a, I>(&mut self, plays: I)
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut counts: HashMap<CompositeKey, (&'a Track, u32)> = HashMap::new();
        for track in plays {
            counts
                .entry(track.composite_key())
                .and_modify(|(latest, count)| {
                    *latest = track;
                    *count += 1;
                })
                .or_insert((track, 1));
        }

        let songs = counts.len();
        for (track, count) in counts.into_values() {
            let estimated = u64::from(track.duration_secs) * u64::from(count);
            self.apply_play(track, estimated, count);
        }
        self.reconcile();
        debug!(op = "sync", songs, size = self.entries.len(), "Favorites synced from playback log");
    }

    /// Apply several mutations and re-sort once at the end
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut FavoritesBatch<'_>) -> R,
    {
        let mut batch = FavoritesBatch { favorites: self };
        let result = f(&mut batch);
        self.reconcile();
        result
    }

    /// Re-sort if anything changed since the last sort
    pub fn optimize(&mut self) {
        self.reconcile();
    }

    /// Replace the stored copy of a track (matched by id).
    ///
    /// If title or artist changed the counters move to the new key, merging
    /// with any entry already there.
    pub fn refresh(&mut self, track: &Track) -> bool {
        let old_key = match self
            .entries
            .iter()
            .find(|(_, entry)| entry.track.id == track.id)
        {
            Some((key, _)) => key.clone(),
            None => return false,
        };

        let Some(mut entry) = self.entries.remove(&old_key) else {
            return false;
        };
        entry.track = track.clone();
        let new_key = track.composite_key();
        match self.entries.get_mut(&new_key) {
            Some(existing) => {
                existing.listening_secs += entry.listening_secs;
                existing.play_count += entry.play_count;
                existing.track = entry.track;
            }
            None => {
                self.entries.insert(new_key, entry);
            }
        }
        self.dirty = true;
        self.reconcile();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ranking.clear();
        self.dirty = false;
    }

    /// Highest-ranked track
    pub fn top(&self) -> Option<&Track> {
        self.ranked().next().map(|entry| &entry.track)
    }

    /// Up to `count` tracks in rank order
    pub fn top_n(&self, count: usize) -> Vec<Track> {
        self.ranked()
            .take(count)
            .map(|entry| entry.track.clone())
            .collect()
    }

    /// Tracks with `min_secs <= listening time <= max_secs`, in rank order
    pub fn by_time_range(&self, min_secs: u64, max_secs: u64) -> Vec<Track> {
        self.ranked()
            .filter(|entry| (min_secs..=max_secs).contains(&entry.listening_secs))
            .map(|entry| entry.track.clone())
            .collect()
    }

    /// Ranked entries with their counters
    pub fn entries(&self) -> impl Iterator<Item = &FavoriteEntry> + '_ {
        self.ranked()
    }

    pub fn total_listening_time(&self) -> u64 {
        self.entries.values().map(|entry| entry.listening_secs).sum()
    }

    /// Mean listening time per tracked song, 0.0 when empty
    pub fn average_listening_time(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.total_listening_time() as f64 / self.entries.len() as f64
    }

    pub fn is_tracked(&self, track: &Track) -> bool {
        self.entries.contains_key(&track.composite_key())
    }

    /// Listening seconds for a track, 0 if untracked
    pub fn listening_time(&self, track: &Track) -> u64 {
        self.entries
            .get(&track.composite_key())
            .map_or(0, |entry| entry.listening_secs)
    }

    /// Play count for a track, 0 if untracked
    pub fn play_count(&self, track: &Track) -> u32 {
        self.entries
            .get(&track.composite_key())
            .map_or(0, |entry| entry.play_count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> FavoritesStats {
        FavoritesStats {
            tracked: self.entries.len(),
            total_listening_secs: self.total_listening_time(),
            average_listening_secs: self.average_listening_time(),
            total_plays: self
                .entries
                .values()
                .map(|entry| u64::from(entry.play_count))
                .sum(),
        }
    }

    fn ranked(&self) -> impl Iterator<Item = &FavoriteEntry> + '_ {
        self.ranking.iter().filter_map(|key| self.entries.get(key))
    }

    fn apply_add(&mut self, track: Track) -> bool {
        if !track.is_valid() {
            debug!(op = "add", "Favorites ignored invalid track");
            return false;
        }
        let key = track.composite_key();
        if self.entries.contains_key(&key) {
            debug!(op = "add", track_id = %track.id, "Already tracked");
            return false;
        }
        debug!(op = "add", track_id = %track.id, size = self.entries.len() + 1, "Favorites add");
        self.entries.insert(key, FavoriteEntry::new(track));
        self.dirty = true;
        true
    }

    fn apply_listening_time(&mut self, track: &Track, delta_secs: u64) {
        self.apply_play(track, delta_secs, 0);
    }

    fn apply_play(&mut self, track: &Track, delta_secs: u64, plays: u32) {
        self.apply_add(track.clone());
        if let Some(entry) = self.entries.get_mut(&track.composite_key()) {
            entry.listening_secs += delta_secs;
            entry.play_count += plays;
            debug!(
                op = "update",
                track_id = %track.id,
                listening_secs = entry.listening_secs,
                play_count = entry.play_count,
                "Favorites counters"
            );
            self.dirty = true;
        }
    }

    fn reconcile(&mut self) {
        if !self.dirty {
            return;
        }
        let mut ranked: Vec<(&CompositeKey, &FavoriteEntry)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        self.ranking = ranked.into_iter().map(|(key, _)| key.clone()).collect();
        self.dirty = false;
    }
}

/// Best first: listening time desc, plays desc, then title, artist, key asc
fn rank_order(a: &(&CompositeKey, &FavoriteEntry), b: &(&CompositeKey, &FavoriteEntry)) -> Ordering {
    let (a_key, a) = a;
    let (b_key, b) = b;
    b.listening_secs
        .cmp(&a.listening_secs)
        .then_with(|| b.play_count.cmp(&a.play_count))
        .then_with(|| a.track.title.cmp(&b.track.title))
        .then_with(|| a.track.artist.cmp(&b.track.artist))
        .then_with(|| a_key.cmp(b_key))
}

/// Mutation handle that defers re-sorting until [`Favorites::batch`] returns
pub struct FavoritesBatch<'a> {
    favorites: &'a mut Favorites,
}

impl FavoritesBatch<'_> {
    pub fn add(&mut self, track: Track) -> bool {
        self.favorites.apply_add(track)
    }

    pub fn update_listening_time(&mut self, track: &Track, delta_secs: u64) {
        self.favorites.apply_listening_time(track, delta_secs);
    }

    pub fn increment_play_count(&mut self, track: &Track) {
        self.favorites.apply_play(track, 0, 1);
    }

    pub fn auto_update_from_playback(&mut self, track: &Track, listened_secs: u64) {
        self.favorites.apply_play(track, listened_secs, 1);
    }
}
