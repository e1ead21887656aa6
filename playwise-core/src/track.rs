//! Track record
//!
//! The value type every container stores. Each container keeps its own copy;
//! changing one copy never touches another.

use crate::human_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Lowest star rating a track can be given
pub const MIN_RATING: u8 = 1;

/// Highest star rating a track can be given
pub const MAX_RATING: u8 = 5;

/// Rating value for tracks that have not been rated
pub const UNRATED: u8 = 0;

/// True when `rating` is a star rating (1-5)
pub fn is_valid_rating(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Music track metadata
///
/// Equality and hashing use the identifier only. Display ordering by
/// title then artist is available through [`Track::cmp_title_artist`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Length in whole seconds
    pub duration_secs: u32,
    /// 0 = unrated, 1-5 = stars
    pub rating: u8,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// When the track entered the system
    pub added_at: DateTime<Utc>,
}

impl Track {
    /// Create an unrated track stamped with the current time
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_secs,
            rating: UNRATED,
            album: None,
            genre: None,
            added_at: Utc::now(),
        }
    }

    /// Create a track with a freshly generated UUIDv4 identifier
    pub fn with_generated_id(
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self::new(generate_id(), title, artist, duration_secs)
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_added_at(mut self, added_at: DateTime<Utc>) -> Self {
        self.added_at = added_at;
        self
    }

    /// Basic validity: non-empty id, title and artist, a positive duration,
    /// and a rating that is either unrated or 1-5
    pub fn is_valid(&self) -> bool {
        self.validation_problem().is_none()
    }

    /// Describe why the track fails [`Track::is_valid`], if it does
    pub fn validation_problem(&self) -> Option<&'static str> {
        if self.id.trim().is_empty() {
            Some("empty id")
        } else if self.title.trim().is_empty() {
            Some("empty title")
        } else if self.artist.trim().is_empty() {
            Some("empty artist")
        } else if self.duration_secs == 0 {
            Some("duration must be positive")
        } else if self.rating > MAX_RATING {
            Some("rating out of range")
        } else {
            None
        }
    }

    pub fn is_rated(&self) -> bool {
        is_valid_rating(self.rating)
    }

    /// Normalized title + artist key used for duplicate detection
    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey::new(&self.title, &self.artist)
    }

    /// Duration as `M:SS` or `H:MM:SS`
    pub fn duration_string(&self) -> String {
        human_time::format_duration(u64::from(self.duration_secs))
    }

    /// Compare by title, then artist
    pub fn cmp_title_artist(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then_with(|| self.artist.cmp(&other.artist))
    }
}

/// The sentinel "no such track": empty fields, fails [`Track::is_valid`]
impl Default for Track {
    fn default() -> Self {
        Self::new(String::new(), String::new(), String::new(), 0)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.title, self.artist, self.duration_string())?;
        if self.is_rated() {
            write!(f, " [Rating: {}/{}]", self.rating, MAX_RATING)?;
        }
        Ok(())
    }
}

/// Generate a new track identifier (UUIDv4, hyphenated)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lower-case a string and collapse every run of whitespace to one space
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized (title, artist) pair
///
/// Two tracks with the same key are considered the same song regardless of
/// their identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(String);

impl CompositeKey {
    const SEPARATOR: &'static str = "|||";

    pub fn new(title: &str, artist: &str) -> Self {
        Self(format!(
            "{}{}{}",
            normalize(title),
            Self::SEPARATOR,
            normalize(artist)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track_is_unrated_and_valid() {
        let track = Track::new("t1", "Imagine", "John Lennon", 183);
        assert_eq!(track.rating, UNRATED);
        assert!(!track.is_rated());
        assert!(track.is_valid());
        assert!(track.validation_problem().is_none());
    }

    #[test]
    fn test_default_track_is_invalid_sentinel() {
        let track = Track::default();
        assert!(!track.is_valid());
        assert_eq!(track.validation_problem(), Some("empty id"));
    }

    #[test]
    fn test_validity_checks_each_field() {
        assert!(!Track::new("", "T", "A", 10).is_valid());
        assert!(!Track::new("id", "  ", "A", 10).is_valid());
        assert!(!Track::new("id", "T", "", 10).is_valid());
        assert_eq!(
            Track::new("id", "T", "A", 0).validation_problem(),
            Some("duration must be positive")
        );
        assert_eq!(
            Track::new("id", "T", "A", 10).with_rating(9).validation_problem(),
            Some("rating out of range")
        );
        assert!(Track::new("id", "T", "A", 10).with_rating(5).is_valid());
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let a = Track::new("same", "One", "X", 100);
        let b = Track::new("same", "Two", "Y", 200);
        let c = Track::new("other", "One", "X", 100);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cmp_title_artist() {
        let a = Track::new("1", "Yesterday", "The Beatles", 125);
        let b = Track::new("2", "Yesterday", "Boyz II Men", 200);
        let c = Track::new("3", "Hey Jude", "The Beatles", 431);
        assert_eq!(a.cmp_title_artist(&b), Ordering::Greater);
        assert_eq!(c.cmp_title_artist(&a), Ordering::Less);
        assert_eq!(a.cmp_title_artist(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_composite_key_normalizes_case_and_whitespace() {
        let a = Track::new("1", "Imagine", "John Lennon", 183);
        let b = Track::new("2", "  IMAGINE ", "john   lennon", 183);
        assert_eq!(a.composite_key(), b.composite_key());
        assert_eq!(a.composite_key().as_str(), "imagine|||john lennon");
    }

    #[test]
    fn test_composite_key_distinguishes_artist() {
        let a = Track::new("1", "Yesterday", "The Beatles", 125);
        let b = Track::new("2", "Yesterday", "Boyz II Men", 200);
        assert_ne!(a.composite_key(), b.composite_key());
    }

    #[test]
    fn test_display_includes_rating_only_when_rated() {
        let track = Track::new("1", "Hotel California", "Eagles", 391);
        assert_eq!(track.to_string(), "Hotel California - Eagles (6:31)");
        let rated = track.with_rating(4);
        assert_eq!(rated.to_string(), "Hotel California - Eagles (6:31) [Rating: 4/5]");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Track::with_generated_id("A", "B", 10);
        let b = Track::with_generated_id("A", "B", 10);
        assert_ne!(a.id, b.id);
        assert!(a.is_valid());
    }

    #[test]
    fn test_is_valid_rating_bounds() {
        assert!(!is_valid_rating(0));
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(6));
    }
}
