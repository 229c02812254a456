// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-consumer cascades and their membership keys.

use smallvec::SmallVec;
use undercoat_props::{PropsId, PropsKey};

use crate::arena::PropsArena;
use crate::cache::OutputCache;
use crate::compiled::OutputId;
use crate::consumer::Consumer;

/// Membership of a cascade, ordered by `(priority, id)`.
///
/// Two keys are equal exactly when they hold the same property sets, so the
/// key doubles as the lookup key for shared compiled outputs. Iteration runs
/// from the lowest to the highest priority.
///
/// # Example
///
/// ```rust
/// use undercoat_cascade::CascadeKey;
/// use undercoat_props::{PropsId, PropsKey};
///
/// let low = PropsKey::new(0, PropsId::from_serial(4));
/// let high = PropsKey::new(10, PropsId::from_serial(1));
///
/// let a: CascadeKey = [high, low].into_iter().collect();
/// let b: CascadeKey = [low, high, low].into_iter().collect();
/// assert_eq!(a, b);
/// assert_eq!(a.iter().collect::<Vec<_>>(), [low, high]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CascadeKey {
    /// Sorted ascending, no duplicates.
    members: SmallVec<[PropsKey; 4]>,
}

impl CascadeKey {
    /// Creates an empty key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of members.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the key has no members.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members from lowest to highest `(priority, id)`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = PropsKey> + '_ {
        self.members.iter().copied()
    }

    /// Iterates member identities in cascade order.
    pub fn ids(&self) -> impl Iterator<Item = PropsId> + '_ {
        self.members.iter().map(|key| key.id)
    }

    /// Returns `true` if the set is a member.
    #[must_use]
    pub fn contains(&self, id: PropsId) -> bool {
        self.members.iter().any(|key| key.id == id)
    }

    /// Returns the highest-priority member.
    #[must_use]
    pub fn top(&self) -> Option<PropsKey> {
        self.members.last().copied()
    }

    /// Adds a member. Returns `false` if it was already present.
    pub fn insert(&mut self, key: PropsKey) -> bool {
        match self.members.binary_search(&key) {
            Ok(_) => false,
            Err(idx) => {
                self.members.insert(idx, key);
                true
            }
        }
    }

    /// Removes the member with the given identity, whatever its priority.
    ///
    /// Returns `false` if it was not a member.
    pub fn remove(&mut self, id: PropsId) -> bool {
        if let Some(idx) = self.members.iter().position(|key| key.id == id) {
            self.members.remove(idx);
            true
        } else {
            false
        }
    }
}

impl FromIterator<PropsKey> for CascadeKey {
    fn from_iter<I: IntoIterator<Item = PropsKey>>(iter: I) -> Self {
        let mut members: SmallVec<[PropsKey; 4]> = iter.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self { members }
    }
}

/// The property sets applied to one consumer, plus its current output binding.
///
/// Cascades are owned by the [`Session`](crate::Session), keyed by consumer.
/// Every membership change detaches the consumer from its old compiled output
/// and attaches it to the one for the new membership, building it if no other
/// consumer shares it yet. An empty cascade is left unbound.
#[derive(Clone, Debug, Default)]
pub struct Cascade {
    key: CascadeKey,
    output: Option<OutputId>,
}

impl Cascade {
    /// Returns the current membership.
    #[must_use]
    pub fn key(&self) -> &CascadeKey {
        &self.key
    }

    /// Returns the compiled output this cascade is bound to, if any.
    #[must_use]
    pub fn output(&self) -> Option<OutputId> {
        self.output
    }

    /// Returns `true` if the set is a member.
    #[must_use]
    pub fn contains(&self, id: PropsId) -> bool {
        self.key.contains(id)
    }

    /// Returns the number of member sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Returns `true` if the cascade has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Adds a set and rebinds. Returns `false` if it was already a member.
    pub(crate) fn add<C: Consumer>(
        &mut self,
        member: PropsKey,
        consumer: &C,
        cache: &mut OutputCache<C>,
        arena: &PropsArena,
    ) -> bool {
        if !self.key.insert(member) {
            return false;
        }
        self.rebind(consumer, cache, arena);
        true
    }

    /// Removes a set and rebinds. Returns `false` if it was not a member.
    pub(crate) fn remove<C: Consumer>(
        &mut self,
        id: PropsId,
        consumer: &C,
        cache: &mut OutputCache<C>,
        arena: &PropsArena,
    ) -> bool {
        if !self.key.remove(id) {
            return false;
        }
        self.rebind(consumer, cache, arena);
        true
    }

    /// Detaches the consumer from its compiled output.
    pub(crate) fn unbind<C: Consumer>(&mut self, consumer: &C, cache: &mut OutputCache<C>) {
        if let Some(output) = self.output.take() {
            cache.unregister(output, consumer);
        }
    }

    fn rebind<C: Consumer>(&mut self, consumer: &C, cache: &mut OutputCache<C>, arena: &PropsArena) {
        self.unbind(consumer, cache);
        if self.key.is_empty() {
            return;
        }
        let output = cache.acquire(&self.key, arena);
        cache.register(output, consumer);
        self.output = Some(output);
    }
}
