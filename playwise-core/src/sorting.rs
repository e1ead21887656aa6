//! Track sorting
//!
//! Merge sort (stable) and quick sort (Lomuto partition, not stable) over a
//! mutable slice of tracks, keyed by a selectable field. The playlist uses
//! these to reorder itself.

use crate::error::{Error, Result};
use crate::track::Track;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Duration,
    Rating,
    Artist,
    DateAdded,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortAlgorithm {
    /// Stable, O(n log n), O(n) scratch space
    #[default]
    Merge,
    /// Not stable, O(n log n) average, O(n^2) worst case
    Quick,
}

/// Key plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCriteria {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortCriteria {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn ascending(key: SortKey) -> Self {
        Self::new(key, SortOrder::Ascending)
    }

    pub fn descending(key: SortKey) -> Self {
        Self::new(key, SortOrder::Descending)
    }

    /// Compare two tracks under this criteria
    pub fn compare(&self, a: &Track, b: &Track) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Duration => a.duration_secs.cmp(&b.duration_secs),
            SortKey::Rating => a.rating.cmp(&b.rating),
            SortKey::Artist => a.artist.cmp(&b.artist),
            SortKey::DateAdded => a.added_at.cmp(&b.added_at),
        };
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Human-readable name, e.g. "Title (A-Z)"
    pub fn name(&self) -> &'static str {
        use SortKey::*;
        use SortOrder::*;
        match (self.key, self.order) {
            (Title, Ascending) => "Title (A-Z)",
            (Title, Descending) => "Title (Z-A)",
            (Duration, Ascending) => "Duration (Shortest First)",
            (Duration, Descending) => "Duration (Longest First)",
            (Rating, Ascending) => "Rating (Lowest First)",
            (Rating, Descending) => "Rating (Highest First)",
            (Artist, Ascending) => "Artist (A-Z)",
            (Artist, Descending) => "Artist (Z-A)",
            (DateAdded, Ascending) => "Date Added (Oldest First)",
            (DateAdded, Descending) => "Date Added (Newest First)",
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "duration" | "length" => Ok(SortKey::Duration),
            "rating" => Ok(SortKey::Rating),
            "artist" => Ok(SortKey::Artist),
            "date" | "added" | "date-added" => Ok(SortKey::DateAdded),
            other => Err(Error::InvalidInput(format!("Unknown sort key: {}", other))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

impl FromStr for SortAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(SortAlgorithm::Merge),
            "quick" => Ok(SortAlgorithm::Quick),
            other => Err(Error::InvalidInput(format!("Unknown sort algorithm: {}", other))),
        }
    }
}

/// Sort `tracks` in place
pub fn sort_tracks(tracks: &mut [Track], criteria: SortCriteria, algorithm: SortAlgorithm) {
    let less = |a: &Track, b: &Track| criteria.compare(a, b) == Ordering::Less;
    match algorithm {
        SortAlgorithm::Merge => merge_sort(tracks, &less),
        SortAlgorithm::Quick => quick_sort(tracks, &less),
    }
    tracing::debug!(
        criteria = criteria.name(),
        algorithm = ?algorithm,
        size = tracks.len(),
        "Sorted tracks"
    );
}

fn merge_sort<F>(tracks: &mut [Track], less: &F)
where
    F: Fn(&Track, &Track) -> bool,
{
    let len = tracks.len();
    if len <= 1 {
        return;
    }

    let mid = len / 2;
    merge_sort(&mut tracks[..mid], less);
    merge_sort(&mut tracks[mid..], less);

    let mut merged = Vec::with_capacity(len);
    {
        let (left, right) = tracks.split_at(mid);
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            // Take from the right only when strictly smaller: keeps equal keys in order
            if less(&right[j], &left[i]) {
                merged.push(right[j].clone());
                j += 1;
            } else {
                merged.push(left[i].clone());
                i += 1;
            }
        }
        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);
    }

    for (slot, track) in tracks.iter_mut().zip(merged) {
        *slot = track;
    }
}

fn quick_sort<F>(tracks: &mut [Track], less: &F)
where
    F: Fn(&Track, &Track) -> bool,
{
    if tracks.len() <= 1 {
        return;
    }

    let pivot = partition(tracks, less);
    let (left, right) = tracks.split_at_mut(pivot);
    quick_sort(left, less);
    quick_sort(&mut right[1..], less);
}

/// Lomuto partition around the last element; returns the pivot's final index
fn partition<F>(tracks: &mut [Track], less: &F) -> usize
where
    F: Fn(&Track, &Track) -> bool,
{
    let high = tracks.len() - 1;
    let mut store = 0;
    for j in 0..high {
        if less(&tracks[j], &tracks[high]) {
            tracks.swap(store, j);
            store += 1;
        }
    }
    tracks.swap(store, high);
    store
}
