//! # PlayWise Core Library
//!
//! In-memory music catalog with several derived views:
//! - Track record shared by every container
//! - Playlist (arena-backed doubly linked sequence)
//! - Bounded playback history with undo
//! - Rating index (binary search tree of rating buckets)
//! - Catalog store with title + artist uniqueness
//! - Favorites ranking by listening time and play count
//!
//! Collaborators built on top of the containers: sorting, duplicate cleaning,
//! dashboard statistics, flat-text snapshots, and the [`Library`] facade that
//! keeps every container in step with the catalog.

pub mod catalog;
pub mod cleaner;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod history;
pub mod human_time;
pub mod library;
pub mod playlist;
pub mod rating_index;
pub mod snapshot;
pub mod sorting;
pub mod track;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use favorites::Favorites;
pub use history::History;
pub use library::{Library, SharedLibrary};
pub use playlist::Playlist;
pub use rating_index::RatingIndex;
pub use track::{CompositeKey, Track};
