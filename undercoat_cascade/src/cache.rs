// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, reference-counted cache of compiled outputs.

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use undercoat_props::{Notification, PropsId};

use crate::arena::PropsArena;
use crate::cascade::CascadeKey;
use crate::compiled::{CompiledOutput, OutputId};
use crate::consumer::Consumer;

/// Every live [`CompiledOutput`], indexed by membership.
///
/// An entry lives exactly as long as it has consumers: it is built on first
/// demand for a membership and disposed as soon as its last consumer leaves.
/// `listeners` maps each property set to the outputs that must hear about its
/// changes.
#[derive(Debug)]
pub(crate) struct OutputCache<C: Consumer> {
    by_key: HashMap<CascadeKey, OutputId>,
    outputs: HashMap<OutputId, CompiledOutput<C>>,
    listeners: HashMap<PropsId, SmallVec<[OutputId; 4]>>,
    next_serial: u64,
}

impl<C: Consumer> Default for OutputCache<C> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
            outputs: HashMap::new(),
            listeners: HashMap::new(),
            next_serial: 0,
        }
    }
}

impl<C: Consumer> OutputCache<C> {
    pub(crate) fn len(&self) -> usize {
        self.outputs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub(crate) fn get(&self, id: OutputId) -> Option<&CompiledOutput<C>> {
        self.outputs.get(&id)
    }

    pub(crate) fn lookup(&self, key: &CascadeKey) -> Option<OutputId> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CompiledOutput<C>> + '_ {
        self.outputs.values()
    }

    pub(crate) fn listener_count(&self, props: PropsId) -> usize {
        self.listeners.get(&props).map_or(0, SmallVec::len)
    }

    /// Returns the output for a membership, building it on a miss.
    ///
    /// The membership is copied into the new entry; later edits to the
    /// caller's key do not affect it.
    pub(crate) fn acquire(&mut self, key: &CascadeKey, arena: &PropsArena) -> OutputId {
        if let Some(id) = self.by_key.get(key) {
            tracing::trace!(output = %id, "reusing compiled output");
            return *id;
        }

        let id = OutputId::from_serial(self.next_serial);
        self.next_serial += 1;
        let output = CompiledOutput::build(id, key.clone(), arena);
        debug_assert!(
            output.key() == key,
            "compiled output key must equal the membership it was built for"
        );
        tracing::debug!(output = %id, members = key.len(), "built compiled output");

        for props in key.ids() {
            self.listeners.entry(props).or_default().push(id);
        }
        self.by_key.insert(key.clone(), id);
        self.outputs.insert(id, output);
        id
    }

    pub(crate) fn register(&mut self, id: OutputId, consumer: &C) {
        match self.outputs.get_mut(&id) {
            Some(output) => output.register(consumer),
            None => tracing::error!(output = %id, "cannot register with a disposed output"),
        }
    }

    /// Unregisters a consumer, disposing the output once nobody uses it.
    pub(crate) fn unregister(&mut self, id: OutputId, consumer: &C) {
        let Some(output) = self.outputs.get_mut(&id) else {
            return;
        };
        if output.unregister(consumer) {
            tracing::debug!(output = %id, "last consumer left; disposing compiled output");
            self.dispose(id);
        }
    }

    fn dispose(&mut self, id: OutputId) {
        let Some(output) = self.outputs.remove(&id) else {
            return;
        };
        self.by_key.remove(output.key());
        for props in output.key().ids() {
            if let Some(outputs) = self.listeners.get_mut(&props) {
                outputs.retain(|o| *o != id);
                if outputs.is_empty() {
                    self.listeners.remove(&props);
                }
            }
        }
    }

    /// Forwards a notification from a property set to every output listening
    /// to it.
    pub(crate) fn notify(&mut self, source: PropsId, notification: Notification, arena: &PropsArena) {
        let Some(targets) = self.listeners.get(&source) else {
            return;
        };
        tracing::trace!(props = %source, ?notification, outputs = targets.len(), "notifying outputs");
        for id in targets {
            if let Some(output) = self.outputs.get_mut(id) {
                output.notify(source, notification, arena);
            }
        }
    }

    /// Runs the apply pass over every output, collecting dead consumers.
    pub(crate) fn apply_all(&mut self, dead: &mut Vec<C>) {
        for output in self.outputs.values_mut() {
            output.apply(dead);
        }
    }

    /// Disposes every output regardless of consumers. Returns how many there
    /// were.
    pub(crate) fn force_clear(&mut self) -> usize {
        let count = self.outputs.len();
        self.outputs.clear();
        self.by_key.clear();
        self.listeners.clear();
        count
    }
}
