//! Duplicate cleaning by normalized title + artist

use crate::track::{CompositeKey, Track};
use std::collections::HashSet;
use tracing::debug;

/// Keep the first occurrence of every title + artist, preserving order
pub fn dedup_tracks(tracks: &[Track]) -> Vec<Track> {
    let mut cleaner = DuplicateCleaner::new();
    let kept: Vec<Track> = tracks
        .iter()
        .filter(|track| cleaner.add(track))
        .cloned()
        .collect();
    debug!(
        input = tracks.len(),
        kept = kept.len(),
        removed = tracks.len() - kept.len(),
        "Removed duplicate tracks"
    );
    kept
}

/// Set of title + artist keys seen so far
#[derive(Debug, Clone, Default)]
pub struct DuplicateCleaner {
    seen: HashSet<CompositeKey>,
}

impl DuplicateCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, track: &Track) -> bool {
        self.seen.contains(&track.composite_key())
    }

    /// Record a track; false if its key was already present
    pub fn add(&mut self, track: &Track) -> bool {
        self.seen.insert(track.composite_key())
    }

    pub fn remove(&mut self, track: &Track) -> bool {
        self.seen.remove(&track.composite_key())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
