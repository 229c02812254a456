// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flush queue: deduplicated, order-preserving pending keys.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

/// Keys waiting to be flushed at the end of a frame.
///
/// Enqueuing is idempotent: a key queued many times in one frame appears once,
/// at the position of its first enqueue. Draining yields keys in that order.
///
/// # Example
///
/// ```
/// use undercoat_cascade::FlushQueue;
///
/// let mut queue = FlushQueue::<u32>::new();
/// assert!(queue.push(3));
/// assert!(queue.push(1));
/// assert!(!queue.push(3));
///
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.take(), vec![3, 1]);
/// assert!(queue.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct FlushQueue<K>
where
    K: Copy + Eq + Hash,
{
    /// Keys in first-enqueue order.
    order: Vec<K>,
    /// Membership index for `order`.
    members: HashSet<K>,
}

impl<K> Default for FlushQueue<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FlushQueue<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// Enqueues a key.
    ///
    /// Returns `true` if the key was newly queued, `false` if it was already
    /// pending.
    pub fn push(&mut self, key: K) -> bool {
        if self.members.insert(key) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the key is pending.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.members.contains(&key)
    }

    /// Returns the number of pending keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates pending keys in first-enqueue order without draining.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Drops a key from the queue, e.g. when its owner is disposed.
    ///
    /// Returns `true` if the key was pending.
    pub fn remove(&mut self, key: K) -> bool {
        if !self.members.remove(&key) {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    /// Takes every pending key, in first-enqueue order, leaving the queue
    /// empty.
    pub fn take(&mut self) -> Vec<K> {
        self.members.clear();
        core::mem::take(&mut self.order)
    }
}
