//! Catalog store
//!
//! Canonical id -> track map with a uniqueness index over the normalized
//! title + artist key. No two identifiers may share a key, and the key index
//! moves in lockstep with the map on every mutation.
//!
//! Each boolean operation has a `try_*` twin that returns the rejection reason.

use crate::error::{Error, Result};
use crate::track::{is_valid_rating, CompositeKey, Track, MAX_RATING};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Primary track store
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Ordered by id so full scans are deterministic
    by_id: BTreeMap<String, Track>,
    /// Composite key -> owning id
    by_key: HashMap<CompositeKey, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new track.
    ///
    /// Rejected without mutation when the track is invalid, its id is taken,
    /// or another track already has the same title and artist.
    pub fn try_insert(&mut self, track: Track) -> Result<()> {
        check_track(&track)?;
        if self.by_id.contains_key(&track.id) {
            return Err(Error::DuplicateId(track.id));
        }
        let key = track.composite_key();
        if let Some(existing_id) = self.by_key.get(&key) {
            return Err(Error::DuplicateTrack {
                title: track.title,
                artist: track.artist,
                existing_id: existing_id.clone(),
            });
        }

        debug!(op = "insert", track_id = %track.id, size = self.by_id.len() + 1, "Catalog insert");
        self.by_key.insert(key, track.id.clone());
        self.by_id.insert(track.id.clone(), track);
        Ok(())
    }

    pub fn insert(&mut self, track: Track) -> bool {
        self.try_insert(track).map_err(log_rejection).is_ok()
    }

    /// Insert every track, skipping rejects; returns how many went in
    pub fn insert_many<I>(&mut self, tracks: I) -> usize
    where
        I: IntoIterator<Item = Track>,
    {
        tracks.into_iter().filter(|track| self.insert(track.clone())).count()
    }

    /// Replace the stored track with the same id.
    ///
    /// When title or artist change, the new key must be free (or already owned
    /// by this id). On rejection nothing changes.
    pub fn try_update(&mut self, track: Track) -> Result<()> {
        check_track(&track)?;
        let old_key = match self.by_id.get(&track.id) {
            Some(existing) => existing.composite_key(),
            None => return Err(Error::NotFound(track.id)),
        };
        let new_key = track.composite_key();

        if new_key != old_key {
            if let Some(owner) = self.by_key.get(&new_key) {
                if *owner != track.id {
                    return Err(Error::DuplicateTrack {
                        title: track.title,
                        artist: track.artist,
                        existing_id: owner.clone(),
                    });
                }
            }
            self.by_key.remove(&old_key);
            self.by_key.insert(new_key, track.id.clone());
        }

        debug!(op = "update", track_id = %track.id, "Catalog update");
        self.by_id.insert(track.id.clone(), track);
        Ok(())
    }

    pub fn update(&mut self, track: Track) -> bool {
        self.try_update(track).map_err(log_rejection).is_ok()
    }

    /// Set the rating of a stored track (1-5 only)
    pub fn try_update_rating(&mut self, id: &str, rating: u8) -> Result<()> {
        if !is_valid_rating(rating) {
            return Err(Error::InvalidRating(rating));
        }
        let track = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        debug!(op = "update_rating", track_id = %id, from = track.rating, to = rating, "Catalog rating change");
        track.rating = rating;
        Ok(())
    }

    pub fn update_rating(&mut self, id: &str, rating: u8) -> bool {
        self.try_update_rating(id, rating).map_err(log_rejection).is_ok()
    }

    /// Remove a track and its key; returns the removed track
    pub fn try_delete(&mut self, id: &str) -> Result<Track> {
        let track = self
            .by_id
            .remove(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.by_key.remove(&track.composite_key());
        debug!(op = "delete", track_id = %id, size = self.by_id.len(), "Catalog delete");
        Ok(track)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.try_delete(id).map_err(log_rejection).is_ok()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Track> {
        self.by_id.get(id)
    }

    /// First track (in id order) whose title matches case-insensitively
    pub fn find_by_title(&self, title: &str) -> Option<&Track> {
        let wanted = title.to_lowercase();
        self.by_id
            .values()
            .find(|track| track.title.to_lowercase() == wanted)
    }

    pub fn find_by_artist(&self, artist: &str) -> Vec<Track> {
        let wanted = artist.to_lowercase();
        self.filter(|track| track.artist.to_lowercase() == wanted)
    }

    pub fn find_by_album(&self, album: &str) -> Vec<Track> {
        let wanted = album.to_lowercase();
        self.filter(|track| track.album.as_deref().map_or(false, |album| album.to_lowercase() == wanted))
    }

    pub fn find_by_genre(&self, genre: &str) -> Vec<Track> {
        let wanted = genre.to_lowercase();
        self.filter(|track| track.genre.as_deref().map_or(false, |genre| genre.to_lowercase() == wanted))
    }

    /// Case-insensitive substring match over title, artist, album and genre.
    /// An empty keyword matches nothing.
    pub fn find_by_keyword(&self, keyword: &str) -> Vec<Track> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.filter(|track| {
            [
                Some(track.title.as_str()),
                Some(track.artist.as_str()),
                track.album.as_deref(),
                track.genre.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        })
    }

    /// Tracks with `min_secs <= duration <= max_secs`
    pub fn find_by_duration_range(&self, min_secs: u32, max_secs: u32) -> Vec<Track> {
        self.filter(|track| (min_secs..=max_secs).contains(&track.duration_secs))
    }

    /// Tracks with `min_rating <= rating <= max_rating`
    pub fn find_by_rating_range(&self, min_rating: u8, max_rating: u8) -> Vec<Track> {
        self.filter(|track| (min_rating..=max_rating).contains(&track.rating))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Id that owns this title + artist, if any
    pub fn owner_of(&self, key: &CompositeKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Every track in id order
    pub fn all_tracks(&self) -> Vec<Track> {
        self.by_id.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> + '_ {
        self.by_id.values()
    }

    /// Distinct artists, sorted
    pub fn artists(&self) -> Vec<String> {
        self.distinct(|track| Some(track.artist.as_str()))
    }

    /// Distinct albums, sorted
    pub fn albums(&self) -> Vec<String> {
        self.distinct(|track| track.album.as_deref())
    }

    /// Distinct genres, sorted
    pub fn genres(&self) -> Vec<String> {
        self.distinct(|track| track.genre.as_deref())
    }

    /// Replace the contents with `tracks`, keeping the first of any duplicates.
    /// Returns how many were accepted.
    pub fn sync_from(&mut self, tracks: &[Track]) -> usize {
        self.clear();
        let accepted = self.insert_many(tracks.iter().cloned());
        debug!(op = "sync", accepted, offered = tracks.len(), "Catalog resynced");
        accepted
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_key.clear();
    }

    fn filter<P>(&self, predicate: P) -> Vec<Track>
    where
        P: Fn(&Track) -> bool,
    {
        self.by_id
            .values()
            .filter(|track| predicate(track))
            .cloned()
            .collect()
    }

    fn distinct<'a, F>(&'a self, field: F) -> Vec<String>
    where
        F: Fn(&'a Track) -> Option<&'a str>,
    {
        self.by_id
            .values()
            .filter_map(field)
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Stored ratings are 0 (unrated) or 1-5
fn check_track(track: &Track) -> Result<()> {
    if track.rating > MAX_RATING {
        return Err(Error::InvalidRating(track.rating));
    }
    match track.validation_problem() {
        Some(problem) => Err(Error::InvalidTrack(problem.to_string())),
        None => Ok(()),
    }
}

fn log_rejection(err: Error) -> Error {
    warn!(error = %err, "Catalog rejected operation");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imagine() -> Track {
        Track::new("song_003", "Imagine", "John Lennon", 183)
            .with_rating(5)
            .with_genre("Pop")
    }

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(imagine());
        catalog.insert(
            Track::new("song_001", "Bohemian Rhapsody", "Queen", 354)
                .with_rating(5)
                .with_album("A Night at the Opera")
                .with_genre("Rock"),
        );
        catalog.insert(
            Track::new("song_005", "Yesterday", "The Beatles", 125)
                .with_rating(4)
                .with_album("Help!")
                .with_genre("Pop"),
        );
        catalog.insert(Track::new("song_006", "Hey Jude", "The Beatles", 431).with_rating(5));
        catalog
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_duplicate_title_artist_rejected() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(imagine()));
        let copy = Track::new("other_id", "Imagine", "John Lennon", 190);
        assert!(!catalog.insert(copy.clone()));
        assert_eq!(catalog.len(), 1);

        match catalog.try_insert(copy) {
            Err(Error::DuplicateTrack { existing_id, .. }) => assert_eq!(existing_id, "song_003"),
            other => panic!("expected DuplicateTrack, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key_ignores_case_and_spacing() {
        let mut catalog = Catalog::new();
        catalog.insert(imagine());
        assert!(!catalog.insert(Track::new("x", " imagine", "JOHN  LENNON", 183)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert(imagine());
        let result = catalog.try_insert(Track::new("song_003", "Other", "Someone", 100));
        assert!(matches!(result, Err(Error::DuplicateId(id)) if id == "song_003"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_invalid_track_rejected() {
        let mut catalog = Catalog::new();
        assert!(!catalog.insert(Track::default()));
        assert!(matches!(
            catalog.try_insert(Track::new("id", "T", "A", 0)),
            Err(Error::InvalidTrack(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_update_moves_key() {
        let mut catalog = seeded();
        let mut renamed = imagine();
        renamed.title = "Imagine (Remastered)".to_string();
        assert!(catalog.update(renamed));

        // Old key is free again, new key is taken
        assert!(catalog.insert(Track::new("new", "Imagine", "John Lennon", 183)));
        assert!(!catalog.insert(Track::new("newer", "imagine (remastered)", "john lennon", 183)));
    }

    #[test]
    fn test_update_into_taken_key_is_atomic() {
        let mut catalog = seeded();
        let mut clash = imagine();
        clash.title = "Yesterday".to_string();
        clash.artist = "The Beatles".to_string();
        assert!(matches!(
            catalog.try_update(clash),
            Err(Error::DuplicateTrack { existing_id, .. }) if existing_id == "song_005"
        ));
        assert_eq!(catalog.find_by_id("song_003").unwrap().title, "Imagine");
        assert_eq!(
            catalog.owner_of(&CompositeKey::new("Imagine", "John Lennon")),
            Some("song_003")
        );
    }

    #[test]
    fn test_update_same_key_other_fields() {
        let mut catalog = seeded();
        let updated = imagine().with_album("Imagine");
        assert!(catalog.update(updated));
        assert_eq!(catalog.find_by_id("song_003").unwrap().album.as_deref(), Some("Imagine"));
    }

    #[test]
    fn test_update_unknown_or_invalid() {
        let mut catalog = seeded();
        assert!(matches!(
            catalog.try_update(Track::new("missing", "T", "A", 10)),
            Err(Error::NotFound(_))
        ));
        assert!(!catalog.update(Track::new("song_003", "", "John Lennon", 183)));
    }

    #[test]
    fn test_update_rating_bounds() {
        let mut catalog = seeded();
        assert!(catalog.update_rating("song_005", 2));
        assert_eq!(catalog.find_by_id("song_005").unwrap().rating, 2);
        assert!(matches!(
            catalog.try_update_rating("song_005", 6),
            Err(Error::InvalidRating(6))
        ));
        assert!(!catalog.update_rating("song_005", 0));
        assert!(!catalog.update_rating("missing", 3));
        assert_eq!(catalog.find_by_id("song_005").unwrap().rating, 2);
    }

    #[test]
    fn test_out_of_range_rating_rejected_on_insert_and_update() {
        let mut catalog = seeded();
        let loud = Track::new("song_009", "Song", "Band", 100).with_rating(9);
        assert!(!catalog.insert(loud.clone()));
        assert!(matches!(catalog.try_insert(loud), Err(Error::InvalidRating(9))));
        assert!(!catalog.contains("song_009"));

        let mut yesterday = catalog.find_by_id("song_005").unwrap().clone();
        yesterday.rating = 200;
        assert!(matches!(catalog.try_update(yesterday), Err(Error::InvalidRating(200))));
        assert_eq!(catalog.find_by_id("song_005").unwrap().rating, 4);
        assert_eq!(catalog.find_by_rating_range(1, 5).len(), catalog.len());
    }

    #[test]
    fn test_delete_frees_key() {
        let mut catalog = seeded();
        assert!(catalog.delete("song_003"));
        assert!(!catalog.contains("song_003"));
        assert!(!catalog.delete("song_003"));
        assert!(catalog.insert(Track::new("again", "Imagine", "John Lennon", 183)));
    }

    #[test]
    fn test_find_by_title_case_insensitive() {
        let catalog = seeded();
        assert_eq!(catalog.find_by_title("imagine").unwrap().id, "song_003");
        assert!(catalog.find_by_title("Imagin").is_none());
    }

    #[test]
    fn test_multi_result_searches_in_id_order() {
        let catalog = seeded();
        assert_eq!(ids(&catalog.find_by_artist("the beatles")), vec!["song_005", "song_006"]);
        assert_eq!(ids(&catalog.find_by_genre("POP")), vec!["song_003", "song_005"]);
        assert_eq!(ids(&catalog.find_by_album("help!")), vec!["song_005"]);
        assert_eq!(ids(&catalog.find_by_rating_range(5, 5)), vec!["song_001", "song_003", "song_006"]);
        assert_eq!(ids(&catalog.find_by_duration_range(120, 200)), vec!["song_003", "song_005"]);
    }

    #[test]
    fn test_find_by_keyword() {
        let catalog = seeded();
        assert_eq!(ids(&catalog.find_by_keyword("opera")), vec!["song_001"]);
        assert_eq!(ids(&catalog.find_by_keyword("BEATLES")), vec!["song_005", "song_006"]);
        assert!(catalog.find_by_keyword("   ").is_empty());
    }

    #[test]
    fn test_distinct_listings() {
        let catalog = seeded();
        assert_eq!(catalog.artists(), vec!["John Lennon", "Queen", "The Beatles"]);
        assert_eq!(catalog.genres(), vec!["Pop", "Rock"]);
        assert_eq!(catalog.albums(), vec!["A Night at the Opera", "Help!"]);
    }

    #[test]
    fn test_sync_from_keeps_first_duplicate() {
        let mut catalog = seeded();
        let tracks = vec![
            Track::new("a", "Song", "Band", 100),
            Track::new("b", "song", "band", 100),
            Track::new("c", "Other", "Band", 100),
        ];
        assert_eq!(catalog.sync_from(&tracks), 2);
        assert_eq!(ids(&catalog.all_tracks()), vec!["a", "c"]);
    }
}
