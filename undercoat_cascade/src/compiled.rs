// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiled outputs: the merged block for one cascade membership.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use undercoat_props::{FieldId, Notification, PropertyBlock, PropsId};

use crate::arena::PropsArena;
use crate::cascade::CascadeKey;
use crate::consumer::Consumer;
use crate::error::Error;

/// Identity of a compiled output within a session.
///
/// Ids are handed out in increasing order and never reused.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OutputId(u64);

impl OutputId {
    pub(crate) const fn from_serial(serial: u64) -> Self {
        Self(serial)
    }

    /// Returns the serial number of this id.
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// Update counters for a compiled output.
///
/// Construction is not counted. Counters wrap on overflow.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Full rebuilds after a member's field set changed.
    pub structural_updates: u64,
    /// Incremental rewrites after a member's values changed.
    pub value_updates: u64,
    /// Times the block was pushed to a consumer by the apply pass.
    pub applies: u64,
}

/// The merged [`PropertyBlock`] for one set of property sets, shared by every
/// consumer whose cascade has exactly that membership.
///
/// For each field, the member with the highest `(priority, id)` that defines
/// it owns it, and the block holds the owner's value. The owner map and the
/// block are rebuilt from scratch when a member's field set changes; value
/// changes only rewrite the fields the changed member owns.
#[derive(Debug)]
pub struct CompiledOutput<C: Consumer> {
    id: OutputId,
    key: CascadeKey,
    block: PropertyBlock,
    owners: HashMap<FieldId, PropsId>,
    owned: HashMap<PropsId, SmallVec<[FieldId; 8]>>,
    consumers: HashSet<C>,
    /// Inactive consumers that missed an apply and still need one.
    stale: HashSet<C>,
    changed: bool,
    stats: OutputStats,
}

impl<C: Consumer> CompiledOutput<C> {
    pub(crate) fn build(id: OutputId, key: CascadeKey, arena: &PropsArena) -> Self {
        let mut output = Self {
            id,
            key,
            block: PropertyBlock::new(),
            owners: HashMap::new(),
            owned: HashMap::new(),
            consumers: HashSet::new(),
            stale: HashSet::new(),
            changed: false,
            stats: OutputStats::default(),
        };
        output.rebuild_owners(arena);
        output.rewrite(arena);
        output
    }

    /// Returns the id of this output.
    #[must_use]
    pub fn id(&self) -> OutputId {
        self.id
    }

    /// Returns the membership this output was compiled for.
    #[must_use]
    pub fn key(&self) -> &CascadeKey {
        &self.key
    }

    /// Returns the merged block.
    #[must_use]
    pub fn block(&self) -> &PropertyBlock {
        &self.block
    }

    /// Returns the member that owns a field.
    #[must_use]
    pub fn owner(&self, field: FieldId) -> Option<PropsId> {
        self.owners.get(&field).copied()
    }

    /// Iterates the fields a member currently owns.
    pub fn owned_fields(&self, props: PropsId) -> impl Iterator<Item = FieldId> + '_ {
        self.owned.get(&props).into_iter().flatten().copied()
    }

    /// Returns the number of registered consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Returns `true` if the consumer is registered.
    #[must_use]
    pub fn has_consumer(&self, consumer: &C) -> bool {
        self.consumers.contains(consumer)
    }

    /// Iterates registered consumers.
    pub fn consumers(&self) -> impl Iterator<Item = &C> + '_ {
        self.consumers.iter()
    }

    /// Returns `true` if the block changed since it was last applied.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns the update counters.
    #[must_use]
    pub fn stats(&self) -> OutputStats {
        self.stats
    }

    // =========================================================================
    // Compilation
    // =========================================================================

    /// Recomputes field ownership from the current member field sets.
    fn rebuild_owners(&mut self, arena: &PropsArena) {
        self.owners.clear();
        self.owned.clear();
        // Ascending order, so later (higher) members overwrite earlier owners.
        for member in self.key.iter() {
            let set = match arena.get(member.id) {
                Ok(set) => set,
                Err(err) => {
                    tracing::error!(output = %self.id, %err, "member missing while compiling");
                    continue;
                }
            };
            for field in set.fields() {
                self.owners.insert(field, member.id);
            }
        }
        for (&field, &owner) in &self.owners {
            self.owned.entry(owner).or_default().push(field);
        }
        for fields in self.owned.values_mut() {
            fields.sort_unstable();
        }
    }

    /// Clears the block and writes every owned field.
    fn rewrite(&mut self, arena: &PropsArena) {
        self.block.clear();
        for (&field, &owner) in &self.owners {
            write_field(self.id, &mut self.block, arena, owner, field);
        }
    }

    /// Handles a structural change of a member.
    pub(crate) fn on_entries_changed(&mut self, source: PropsId, arena: &PropsArena) {
        tracing::trace!(output = %self.id, props = %source, "rebuilding after structural change");
        self.rebuild_owners(arena);
        self.rewrite(arena);
        self.changed = true;
        self.stats.structural_updates = self.stats.structural_updates.wrapping_add(1);
    }

    /// Handles a value change of a member.
    ///
    /// With a field, the write only happens if `source` still owns it; with
    /// none, every field `source` owns is rewritten. Returns `true` if the
    /// block was touched.
    pub(crate) fn on_value_changed(
        &mut self,
        source: PropsId,
        field: Option<FieldId>,
        arena: &PropsArena,
    ) -> bool {
        match field {
            Some(field) => {
                if self.owners.get(&field) != Some(&source) {
                    return false;
                }
                write_field(self.id, &mut self.block, arena, source, field);
            }
            None => {
                let Some(fields) = self.owned.get(&source) else {
                    return false;
                };
                for &field in fields {
                    write_field(self.id, &mut self.block, arena, source, field);
                }
            }
        }
        self.changed = true;
        self.stats.value_updates = self.stats.value_updates.wrapping_add(1);
        true
    }

    pub(crate) fn notify(&mut self, source: PropsId, notification: Notification, arena: &PropsArena) {
        match notification {
            Notification::EntriesChanged => self.on_entries_changed(source, arena),
            Notification::ValueChanged(field) => {
                self.on_value_changed(source, field, arena);
            }
        }
    }

    // =========================================================================
    // Consumers
    // =========================================================================

    /// Adds a consumer and immediately pushes the current block to it.
    pub(crate) fn register(&mut self, consumer: &C) {
        if consumer.is_alive() {
            consumer.apply_output(&self.block);
        }
        self.consumers.insert(consumer.clone());
    }

    /// Removes a consumer, pushing the neutral block to it if it is still
    /// alive. Returns `true` if no consumers remain.
    pub(crate) fn unregister(&mut self, consumer: &C) -> bool {
        self.stale.remove(consumer);
        if self.consumers.remove(consumer) && consumer.is_alive() {
            consumer.apply_output(&PropertyBlock::EMPTY);
        }
        self.consumers.is_empty()
    }

    /// Pushes the block to consumers that need it.
    ///
    /// Dead consumers are collected into `dead` for the caller to unregister.
    /// Inactive consumers are remembered and caught up on a later pass.
    pub(crate) fn apply(&mut self, dead: &mut Vec<C>) {
        if !self.changed && self.stale.is_empty() {
            return;
        }
        for consumer in &self.consumers {
            if !consumer.is_alive() {
                dead.push(consumer.clone());
                continue;
            }
            if !consumer.is_active() {
                if self.changed {
                    self.stale.insert(consumer.clone());
                }
                continue;
            }
            if self.changed || self.stale.remove(consumer) {
                consumer.apply_output(&self.block);
                self.stats.applies = self.stats.applies.wrapping_add(1);
            }
        }
        self.changed = false;
    }
}

fn write_field(
    output: OutputId,
    block: &mut PropertyBlock,
    arena: &PropsArena,
    owner: PropsId,
    field: FieldId,
) {
    let written = arena.get(owner).and_then(|set| {
        set.write(field, block)
            .map_err(|_| Error::FieldNotFound { props: owner, field })
    });
    if let Err(err) = written {
        tracing::error!(%output, %err, "failed to write owned field");
    }
}
