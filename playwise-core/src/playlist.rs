//! Playlist
//!
//! Named, ordered, mutable sequence of tracks stored as a doubly linked list.
//! Nodes live in an arena (`Vec` of slots) and link to each other by slot
//! index, so there is no shared ownership and no unsafe code. Freed slots are
//! recycled through a free list.
//!
//! Positions are always contiguous `0..len()` and agree with link traversal in
//! both directions.

use crate::sorting::{self, SortAlgorithm, SortCriteria};
use crate::track::Track;
use rand::seq::SliceRandom;
use tracing::debug;

/// Default name for a playlist created without one
pub const DEFAULT_PLAYLIST_NAME: &str = "My Playlist";

#[derive(Debug, Clone)]
struct Node {
    track: Track,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Arena-backed doubly linked playlist
///
/// `Clone` copies the whole arena, so a cloned playlist owns new nodes and new
/// track copies.
#[derive(Debug, Clone)]
pub struct Playlist {
    name: String,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a track at the end. O(1).
    pub fn push_back(&mut self, track: Track) {
        let slot = self.allocate(track);
        self.link_after(slot, self.tail);
        debug!(op = "push_back", playlist = %self.name, size = self.len, "Added track at end");
    }

    /// Insert a track so that it ends up at `position`.
    ///
    /// Valid positions are `0..=len()`. Returns false (and drops nothing into
    /// the list) when out of range.
    pub fn insert_at(&mut self, track: Track, position: usize) -> bool {
        if position > self.len {
            debug!(
                op = "insert_at",
                position,
                size = self.len,
                "Rejected insert: position out of range"
            );
            return false;
        }

        let after = if position == 0 {
            None
        } else {
            self.slot_at(position - 1)
        };
        let slot = self.allocate(track);
        self.link_after(slot, after);
        debug!(op = "insert_at", position, size = self.len, "Inserted track");
        true
    }

    /// Remove the track at `position`. Returns false when out of range.
    pub fn remove_at(&mut self, position: usize) -> bool {
        self.take_at(position).is_some()
    }

    /// Remove and return the track at `position`
    pub fn take_at(&mut self, position: usize) -> Option<Track> {
        let Some(slot) = self.slot_at(position) else {
            debug!(
                op = "remove_at",
                position,
                size = self.len,
                "Rejected delete: position out of range"
            );
            return None;
        };
        let track = self.release(slot);
        debug!(op = "remove_at", position, size = self.len, track_id = %track.id, "Deleted track");
        Some(track)
    }

    /// Remove the first track with this id
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        match self.position_of(id) {
            Some(position) => self.remove_at(position),
            None => false,
        }
    }

    /// Remove every track with this id, returning how many were removed
    pub fn remove_all_by_id(&mut self, id: &str) -> usize {
        let slots: Vec<usize> = self
            .slot_iter()
            .filter(|&slot| self.node(slot).track.id == id)
            .collect();
        for &slot in &slots {
            self.release(slot);
        }
        slots.len()
    }

    /// Move the track at `from` so that it ends up at `to`.
    ///
    /// Both indices must be in `0..len()`. `from == to` succeeds without
    /// changing anything. The node is relinked, not reallocated.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.len || to >= self.len {
            debug!(op = "move_to", from, to, size = self.len, "Rejected move: index out of range");
            return false;
        }
        if from == to {
            return true;
        }

        let Some(slot) = self.slot_at(from) else {
            return false;
        };
        self.unlink(slot);
        // Positions are now relative to the list without the moved node
        let after = if to == 0 { None } else { self.slot_at(to - 1) };
        self.link_after(slot, after);
        debug!(op = "move_to", from, to, size = self.len, "Moved track");
        true
    }

    /// Reverse the playlist in place by swapping every node's links. O(n).
    pub fn reverse(&mut self) {
        if self.len <= 1 {
            return;
        }

        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = self.node_mut(slot);
            std::mem::swap(&mut node.prev, &mut node.next);
            // The old `next` is now `prev`
            cursor = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
        debug!(op = "reverse", size = self.len, "Reversed playlist");
    }

    /// First track matching `predicate`, in playlist order
    pub fn find<P>(&self, mut predicate: P) -> Option<&Track>
    where
        P: FnMut(&Track) -> bool,
    {
        self.iter().find(|track| predicate(track))
    }

    /// Mutable access to the first track matching `predicate`
    pub fn find_mut<P>(&mut self, mut predicate: P) -> Option<&mut Track>
    where
        P: FnMut(&Track) -> bool,
    {
        let slot = self
            .slot_iter()
            .find(|&slot| predicate(&self.node(slot).track))?;
        Some(&mut self.node_mut(slot).track)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Track> {
        self.find(|track| track.id == id)
    }

    /// Position of the first track with this id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.iter().position(|track| track.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.slot_at(index).map(|slot| &self.node(slot).track)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        let slot = self.slot_at(index)?;
        Some(&mut self.node_mut(slot).track)
    }

    /// Replace every copy of `track` (matched by id) with the given value.
    /// Returns how many copies were refreshed.
    pub fn refresh(&mut self, track: &Track) -> usize {
        let slots: Vec<usize> = self
            .slot_iter()
            .filter(|&slot| self.node(slot).track.id == track.id)
            .collect();
        for &slot in &slots {
            self.node_mut(slot).track = track.clone();
        }
        slots.len()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate in playlist order; `.rev()` walks the `prev` links
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            playlist: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Copy the tracks out in playlist order
    pub fn to_vec(&self) -> Vec<Track> {
        self.iter().cloned().collect()
    }

    /// Randomly reorder the playlist
    pub fn shuffle(&mut self) {
        if self.len <= 1 {
            return;
        }
        let mut tracks = self.drain();
        tracks.shuffle(&mut rand::thread_rng());
        self.extend(tracks);
        debug!(op = "shuffle", size = self.len, "Shuffled playlist");
    }

    /// Reorder the playlist with the sorting utility
    pub fn sort_by(&mut self, criteria: SortCriteria, algorithm: SortAlgorithm) {
        if self.len <= 1 {
            return;
        }
        let mut tracks = self.drain();
        sorting::sort_tracks(&mut tracks, criteria, algorithm);
        self.extend(tracks);
    }

    /// Remove every track and return them in playlist order
    fn drain(&mut self) -> Vec<Track> {
        let mut tracks = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            cursor = self.node(slot).next;
            if let Some(node) = self.slots[slot].take() {
                tracks.push(node.track);
            }
        }
        self.clear();
        tracks
    }

    fn slot_iter(&self) -> SlotIter<'_> {
        SlotIter {
            playlist: self,
            cursor: self.head,
        }
    }

    /// Slot index of the node at `position`, walking from the nearer end
    fn slot_at(&self, position: usize) -> Option<usize> {
        if position >= self.len {
            return None;
        }

        if position <= self.len / 2 {
            let mut cursor = self.head;
            for _ in 0..position {
                cursor = cursor.and_then(|slot| self.node(slot).next);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..(self.len - 1 - position) {
                cursor = cursor.and_then(|slot| self.node(slot).prev);
            }
            cursor
        }
    }

    fn allocate(&mut self, track: Track) -> usize {
        let node = Node {
            track,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Link a detached node after `after` (or at the head when `None`)
    fn link_after(&mut self, slot: usize, after: Option<usize>) {
        let next = match after {
            Some(prev) => self.node(prev).next,
            None => self.head,
        };

        {
            let node = self.node_mut(slot);
            node.prev = after;
            node.next = next;
        }

        match after {
            Some(prev) => self.node_mut(prev).next = Some(slot),
            None => self.head = Some(slot),
        }
        match next {
            Some(next) => self.node_mut(next).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.len += 1;
    }

    /// Detach a node from its neighbours without freeing the slot. O(1).
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    /// Unlink a node, free its slot and hand back the track
    fn release(&mut self, slot: usize) -> Track {
        self.unlink(slot);
        self.free.push(slot);
        match self.slots[slot].take() {
            Some(node) => node.track,
            None => unreachable!("linked slot {} was empty", slot),
        }
    }

    fn node(&self, slot: usize) -> &Node {
        match self.slots.get(slot) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling playlist link to slot {}", slot),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        match self.slots.get_mut(slot) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling playlist link to slot {}", slot),
        }
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_NAME)
    }
}

impl Extend<Track> for Playlist {
    fn extend<I: IntoIterator<Item = Track>>(&mut self, iter: I) {
        for track in iter {
            let slot = self.allocate(track);
            self.link_after(slot, self.tail);
        }
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over a playlist's links
pub struct Iter<'a> {
    playlist: &'a Playlist,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Track;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.playlist.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.playlist.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.track)
    }
}

impl ExactSizeIterator for Iter<'_> {}

struct SlotIter<'a> {
    playlist: &'a Playlist,
    cursor: Option<usize>,
}

impl Iterator for SlotIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let slot = self.cursor?;
        self.cursor = self.playlist.node(slot).next;
        Some(slot)
    }
}
