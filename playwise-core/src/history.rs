//! Playback history
//!
//! Capacity-bounded last-in-first-out record of played tracks. The most recent
//! play is on top; `pop` undoes it. When the history is full the single oldest
//! entry is evicted before a new one goes in.

use crate::track::Track;
use std::collections::VecDeque;
use tracing::debug;

/// Capacity used when none (or zero) is given
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Bounded playback history
///
/// Stored oldest-first: the back of the deque is the top of the stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Track>,
    capacity: usize,
}

impl History {
    /// Create a history holding at most `capacity` plays.
    /// A capacity of 0 falls back to [`DEFAULT_HISTORY_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Record a play, evicting the oldest entry first when full
    pub fn push(&mut self, track: Track) {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(op = "evict", track_id = %evicted.id, capacity = self.capacity, "Evicted oldest play");
            }
        }
        debug!(op = "push", track_id = %track.id, size = self.entries.len() + 1, "Recorded play");
        self.entries.push_back(track);
    }

    /// Undo the most recent play
    pub fn pop(&mut self) -> Option<Track> {
        let track = self.entries.pop_back();
        match &track {
            Some(track) => debug!(op = "pop", track_id = %track.id, size = self.entries.len(), "Undid last play"),
            None => debug!(op = "pop", "Undo on empty history"),
        }
        track
    }

    /// Most recent play without removing it
    pub fn peek(&self) -> Option<&Track> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting the oldest excess immediately.
    /// Returns false (and changes nothing) for a capacity of 0.
    pub fn set_capacity(&mut self, capacity: usize) -> bool {
        if capacity == 0 {
            return false;
        }
        self.capacity = capacity;
        let excess = self.entries.len().saturating_sub(capacity);
        if excess > 0 {
            self.remove_oldest(excess);
        }
        true
    }

    /// Drop up to `count` of the oldest plays, returning how many went
    pub fn remove_oldest(&mut self, count: usize) -> usize {
        let removed = count.min(self.entries.len());
        self.entries.drain(..removed);
        if removed > 0 {
            debug!(op = "remove_oldest", removed, size = self.entries.len(), "Trimmed history");
        }
        removed
    }

    /// Up to `count` most recent plays, most recent first
    pub fn recent(&self, count: usize) -> Vec<Track> {
        self.entries.iter().rev().take(count).cloned().collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|track| track.id == id)
    }

    /// How many times this id appears in the history
    pub fn count_plays_of(&self, id: &str) -> usize {
        self.entries.iter().filter(|track| track.id == id).count()
    }

    /// Iterate oldest play first
    pub fn iter_chronological(&self) -> impl DoubleEndedIterator<Item = &Track> + '_ {
        self.entries.iter()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
