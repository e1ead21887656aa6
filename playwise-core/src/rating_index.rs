//! Rating index
//!
//! Binary search tree keyed by star rating (1-5). Each node holds one rating
//! value and an unordered bucket of tracks with that rating. Nodes are created
//! on the first insert for a rating and removed when their bucket empties.
//!
//! Out-of-range ratings are rejected with `false`, the same policy the catalog
//! applies when updating a rating.

use crate::track::{is_valid_rating, Track};
use std::cmp::Ordering;
use tracing::debug;

type Link = Option<Box<RatingNode>>;

#[derive(Debug, Clone)]
struct RatingNode {
    rating: u8,
    tracks: Vec<Track>,
    left: Link,
    right: Link,
}

impl RatingNode {
    fn new(rating: u8) -> Self {
        Self {
            rating,
            tracks: Vec::new(),
            left: None,
            right: None,
        }
    }
}

/// Rating-bucketed binary search tree
#[derive(Debug, Clone, Default)]
pub struct RatingIndex {
    root: Link,
    total: usize,
}

impl RatingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a copy of `track` to the bucket for `rating`.
    ///
    /// The stored copy's rating is set to `rating`. Returns false for ratings
    /// outside 1-5.
    pub fn insert(&mut self, mut track: Track, rating: u8) -> bool {
        if !is_valid_rating(rating) {
            debug!(op = "insert", rating, track_id = %track.id, "Rejected insert: rating out of range");
            return false;
        }

        track.rating = rating;
        let node = entry(&mut self.root, rating);
        debug!(op = "insert", rating, track_id = %track.id, bucket = node.tracks.len() + 1, "Indexed track");
        node.tracks.push(track);
        self.total += 1;
        true
    }

    /// Remove the track with `id` from the bucket for `rating`.
    /// An emptied bucket takes its node with it.
    pub fn remove(&mut self, id: &str, rating: u8) -> bool {
        self.take(id, rating).is_some()
    }

    fn take(&mut self, id: &str, rating: u8) -> Option<Track> {
        let node = find_node_mut(&mut self.root, rating)?;
        let position = node.tracks.iter().position(|track| track.id == id)?;
        let track = node.tracks.remove(position);
        let now_empty = node.tracks.is_empty();
        self.total -= 1;

        if now_empty {
            delete_node(&mut self.root, rating);
            debug!(op = "remove", rating, track_id = %id, "Removed track and empty bucket");
        } else {
            debug!(op = "remove", rating, track_id = %id, "Removed track");
        }
        Some(track)
    }

    /// Move a track from one rating bucket to another
    pub fn move_track(&mut self, id: &str, from: u8, to: u8) -> bool {
        if !is_valid_rating(to) {
            return false;
        }
        match self.take(id, from) {
            Some(track) => self.insert(track, to),
            None => false,
        }
    }

    /// Replace the stored copy of `track` (matched by id), keeping its bucket.
    pub fn refresh(&mut self, track: &Track) -> bool {
        fn visit(link: &mut Link, track: &Track) -> bool {
            let Some(node) = link else {
                return false;
            };
            let rating = node.rating;
            if let Some(slot) = node.tracks.iter_mut().find(|t| t.id == track.id) {
                *slot = track.clone();
                slot.rating = rating;
                return true;
            }
            visit(&mut node.left, track) || visit(&mut node.right, track)
        }
        visit(&mut self.root, track)
    }

    /// Tracks in the bucket for `rating`
    pub fn songs_at(&self, rating: u8) -> Vec<Track> {
        self.bucket(rating).map(<[Track]>::to_vec).unwrap_or_default()
    }

    /// Borrow the bucket for `rating`, if one exists
    pub fn bucket(&self, rating: u8) -> Option<&[Track]> {
        find_node(&self.root, rating).map(|node| node.tracks.as_slice())
    }

    /// Tracks with `min_rating <= rating <= max_rating`, ascending by rating
    pub fn songs_in_range(&self, min_rating: u8, max_rating: u8) -> Vec<Track> {
        fn visit(link: &Link, min: u8, max: u8, out: &mut Vec<Track>) {
            let Some(node) = link else {
                return;
            };
            if node.rating > min {
                visit(&node.left, min, max, out);
            }
            if (min..=max).contains(&node.rating) {
                out.extend(node.tracks.iter().cloned());
            }
            if node.rating < max {
                visit(&node.right, min, max, out);
            }
        }

        let mut result = Vec::new();
        if min_rating <= max_rating {
            visit(&self.root, min_rating, max_rating, &mut result);
        }
        result
    }

    /// Up to `count` tracks, walking ratings from 5 down to 1.
    /// Order within a bucket is unspecified.
    pub fn top_rated(&self, count: usize) -> Vec<Track> {
        fn visit(link: &Link, count: usize, out: &mut Vec<Track>) {
            let Some(node) = link else {
                return;
            };
            if out.len() >= count {
                return;
            }
            visit(&node.right, count, out);
            let room = count.saturating_sub(out.len());
            out.extend(node.tracks.iter().take(room).cloned());
            visit(&node.left, count, out);
        }

        let mut result = Vec::with_capacity(count.min(self.total));
        visit(&self.root, count, &mut result);
        result
    }

    /// Every track, ascending by rating (inorder traversal)
    pub fn all_songs(&self) -> Vec<Track> {
        let mut result = Vec::with_capacity(self.total);
        inorder(&self.root, &mut |node| result.extend(node.tracks.iter().cloned()));
        result
    }

    /// Distinct ratings present, ascending
    pub fn ratings(&self) -> Vec<u8> {
        let mut ratings = Vec::new();
        inorder(&self.root, &mut |node| ratings.push(node.rating));
        ratings
    }

    /// `(rating, bucket size)` pairs, ascending by rating
    pub fn bucket_sizes(&self) -> Vec<(u8, usize)> {
        let mut sizes = Vec::new();
        inorder(&self.root, &mut |node| sizes.push((node.rating, node.tracks.len())));
        sizes
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        fn height(link: &Link) -> usize {
            match link {
                Some(node) => 1 + height(&node.left).max(height(&node.right)),
                None => 0,
            }
        }
        height(&self.root)
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Mean rating over every indexed track, 0.0 when empty
    pub fn average_rating(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: usize = self
            .bucket_sizes()
            .iter()
            .map(|&(rating, size)| usize::from(rating) * size)
            .sum();
        sum as f64 / self.total as f64
    }

    /// Rating with the largest bucket; ties go to the higher rating
    pub fn most_common_rating(&self) -> Option<u8> {
        self.bucket_sizes()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(rating, _)| rating)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Locate a track by id in any bucket
    pub fn find(&self, id: &str) -> Option<&Track> {
        fn visit<'a>(link: &'a Link, id: &str) -> Option<&'a Track> {
            let node = link.as_ref()?;
            node.tracks
                .iter()
                .find(|track| track.id == id)
                .or_else(|| visit(&node.left, id))
                .or_else(|| visit(&node.right, id))
        }
        visit(&self.root, id)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.total = 0;
    }

    /// Rebuild the tree from an inorder snapshot into a height-balanced shape
    pub fn rebalance(&mut self) {
        fn collect(link: Link, out: &mut Vec<(u8, Vec<Track>)>) {
            if let Some(node) = link {
                let node = *node;
                collect(node.left, out);
                out.push((node.rating, node.tracks));
                collect(node.right, out);
            }
        }

        fn build(buckets: &mut [Option<(u8, Vec<Track>)>]) -> Link {
            if buckets.is_empty() {
                return None;
            }
            let mid = buckets.len() / 2;
            let (left, rest) = buckets.split_at_mut(mid);
            let (middle, right) = rest.split_at_mut(1);
            let (rating, tracks) = middle[0].take()?;
            Some(Box::new(RatingNode {
                rating,
                tracks,
                left: build(left),
                right: build(right),
            }))
        }

        let before = self.height();
        let mut buckets = Vec::new();
        collect(self.root.take(), &mut buckets);
        let mut buckets: Vec<Option<(u8, Vec<Track>)>> = buckets.into_iter().map(Some).collect();
        self.root = build(&mut buckets);
        debug!(op = "rebalance", before, after = self.height(), size = self.total, "Rebuilt rating tree");
    }
}

/// Find or create the node for `rating`
fn entry(link: &mut Link, rating: u8) -> &mut RatingNode {
    let node = link.get_or_insert_with(|| Box::new(RatingNode::new(rating)));
    match rating.cmp(&node.rating) {
        Ordering::Less => entry(&mut node.left, rating),
        Ordering::Greater => entry(&mut node.right, rating),
        Ordering::Equal => &mut **node,
    }
}

fn find_node(link: &Link, rating: u8) -> Option<&RatingNode> {
    let mut current = link.as_deref();
    while let Some(node) = current {
        current = match rating.cmp(&node.rating) {
            Ordering::Less => node.left.as_deref(),
            Ordering::Greater => node.right.as_deref(),
            Ordering::Equal => return Some(node),
        };
    }
    None
}

fn find_node_mut(link: &mut Link, rating: u8) -> Option<&mut RatingNode> {
    let mut current = link.as_deref_mut();
    while let Some(node) = current {
        current = match rating.cmp(&node.rating) {
            Ordering::Less => node.left.as_deref_mut(),
            Ordering::Greater => node.right.as_deref_mut(),
            Ordering::Equal => return Some(node),
        };
    }
    None
}

/// Standard BST deletion by key. The two-child case copies the inorder
/// successor's rating and bucket, then deletes the successor.
fn delete_node(link: &mut Link, rating: u8) {
    let Some(node) = link else {
        return;
    };
    match rating.cmp(&node.rating) {
        Ordering::Less => delete_node(&mut node.left, rating),
        Ordering::Greater => delete_node(&mut node.right, rating),
        Ordering::Equal => {
            if node.left.is_none() {
                *link = node.right.take();
            } else if node.right.is_none() {
                *link = node.left.take();
            } else if let Some((successor_rating, successor_tracks)) = take_min(&mut node.right) {
                node.rating = successor_rating;
                node.tracks = successor_tracks;
            }
        }
    }
}

/// Detach the leftmost node of a subtree, returning its rating and bucket
fn take_min(link: &mut Link) -> Option<(u8, Vec<Track>)> {
    if link.as_ref()?.left.is_some() {
        return take_min(&mut link.as_mut()?.left);
    }
    let mut node = link.take()?;
    *link = node.right.take();
    Some((node.rating, std::mem::take(&mut node.tracks)))
}

fn inorder<F>(link: &Link, visit: &mut F)
where
    F: FnMut(&RatingNode),
{
    if let Some(node) = link {
        inorder(&node.left, visit);
        visit(node);
        inorder(&node.right, visit);
    }
}
