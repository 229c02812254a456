// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The update coordinator.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use undercoat_props::{
    Change, Color, FieldId, FieldNames, PropertySet, PropsId, TextureHandle, Value, Vec4,
};

use crate::arena::PropsArena;
use crate::cache::OutputCache;
use crate::cascade::{Cascade, CascadeKey};
use crate::compiled::{CompiledOutput, OutputId};
use crate::config::SessionConfig;
use crate::consumer::{Consumer, FrameScheduler};
use crate::error::Error;
use crate::queue::FlushQueue;

/// What a [`Session::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Property sets whose batch was closed.
    pub flushed: usize,
    /// Dead consumers that were unregistered.
    pub pruned: usize,
}

/// What [`Session::teardown`] found and cleaned up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Cascades that were still registered.
    pub cascades: usize,
    /// Compiled outputs that still had consumers when teardown started.
    pub outputs: usize,
    /// Property sets that were never disposed.
    pub props: usize,
}

impl TeardownReport {
    /// Returns `true` if nothing was left behind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cascades == 0 && self.outputs == 0 && self.props == 0
    }
}

/// Owns all property sets, cascades and compiled outputs of one host, and
/// coordinates when changes reach consumers.
///
/// # Frame model
///
/// Changes inside a batch are collected per property set. The first set queued
/// in a frame asks the [`FrameScheduler`] for an end-of-frame callback, and
/// the host answers by calling [`Session::tick`], which:
///
/// 1. sweeps consumers the host destroyed (see
///    [`SessionConfig::sweep_every_tick`]),
/// 2. closes each queued batch in the order the sets were queued, delivering
///    at most one notification per set,
/// 3. pushes every changed compiled output to its live, active consumers.
///
/// Newly created sets start in a batch. With [`SessionConfig::auto_batch`]
/// (the default), a change made outside a batch opens one, so a set is
/// delivered at most once per frame. Without it, such changes reach compiled
/// outputs immediately, and the consumers see them on the next tick.
///
/// # Example
///
/// ```rust
/// use std::cell::{Cell, RefCell};
/// use std::rc::Rc;
/// use undercoat_cascade::{Consumer, Session, SessionConfig};
/// use undercoat_props::{Color, PropertyBlock};
///
/// #[derive(Debug, Default)]
/// struct Part {
///     dead: Cell<bool>,
///     block: RefCell<PropertyBlock>,
/// }
///
/// #[derive(Clone, Debug)]
/// struct PartRef(Rc<Part>);
///
/// impl PartialEq for PartRef {
///     fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
/// }
/// impl Eq for PartRef {}
/// impl std::hash::Hash for PartRef {
///     fn hash<H: std::hash::Hasher>(&self, state: &mut H) { Rc::as_ptr(&self.0).hash(state) }
/// }
/// impl Consumer for PartRef {
///     fn apply_output(&self, block: &PropertyBlock) { *self.0.block.borrow_mut() = block.clone(); }
///     fn is_alive(&self) -> bool { !self.0.dead.get() }
/// }
///
/// let mut session = Session::new(SessionConfig::default(), || {});
/// let color = session.field_names_mut().intern("_Color");
///
/// let part = PartRef(Rc::new(Part::default()));
/// let highlight = session.create_props(10);
/// session.set_color(highlight, color, Color::rgb(1.0, 0.0, 0.0)).unwrap();
/// session.set(&part, highlight);
/// session.tick();
///
/// assert_eq!(part.0.block.borrow().color(color), Some(Color::rgb(1.0, 0.0, 0.0)));
///
/// session.dispose_props(highlight).unwrap();
/// assert!(part.0.block.borrow().is_empty());
/// assert!(session.teardown().is_clean());
/// ```
pub struct Session<C: Consumer> {
    config: SessionConfig,
    names: FieldNames,
    arena: PropsArena,
    cascades: HashMap<C, Cascade>,
    cache: OutputCache<C>,
    queue: FlushQueue<PropsId>,
    scheduler: Box<dyn FrameScheduler>,
    tick_requested: bool,
}

impl<C: Consumer> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("props", &self.arena.len())
            .field("cascades", &self.cascades.len())
            .field("outputs", &self.cache.len())
            .field("pending", &self.queue.len())
            .field("tick_requested", &self.tick_requested)
            .finish_non_exhaustive()
    }
}

impl<C: Consumer> Session<C> {
    /// Creates an empty session.
    ///
    /// Field names start seeded with the common parameter names.
    pub fn new(config: SessionConfig, scheduler: impl FrameScheduler + 'static) -> Self {
        Self {
            config,
            names: FieldNames::with_common(),
            arena: PropsArena::default(),
            cascades: HashMap::new(),
            cache: OutputCache::default(),
            queue: FlushQueue::new(),
            scheduler: Box::new(scheduler),
            tick_requested: false,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the field name registry used for diagnostics.
    #[must_use]
    pub fn field_names(&self) -> &FieldNames {
        &self.names
    }

    /// Returns the field name registry for interning or binding names.
    pub fn field_names_mut(&mut self) -> &mut FieldNames {
        &mut self.names
    }

    /// Interns a batch of field names, returning their ids in order.
    pub fn register_field_names<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<FieldId> {
        names.into_iter().map(|name| self.names.intern(name)).collect()
    }

    // =========================================================================
    // Property sets
    // =========================================================================

    /// Creates a property set.
    ///
    /// The set starts inside a batch, so everything set on it this frame is
    /// delivered as one notification.
    pub fn create_props(&mut self, priority: i32) -> PropsId {
        let id = self.arena.create(priority);
        tracing::debug!(props = %id, priority, "created property set");
        self.schedule(id);
        id
    }

    /// Returns a property set, or `None` once disposed.
    #[must_use]
    pub fn props(&self, id: PropsId) -> Option<&PropertySet> {
        self.arena.get(id).ok()
    }

    /// Returns `true` if the property set has not been disposed.
    #[must_use]
    pub fn contains_props(&self, id: PropsId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the number of live property sets.
    #[must_use]
    pub fn props_count(&self) -> usize {
        self.arena.len()
    }

    /// Sets a field on a property set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_value(
        &mut self,
        id: PropsId,
        field: FieldId,
        value: impl Into<Value>,
    ) -> Result<Change, Error> {
        let value = value.into();
        let tolerance = *self.config.tolerance();
        let change = self.lookup_mut(id)?.set(field, value, &tolerance);
        self.route(id, change);
        Ok(change)
    }

    /// Sets a color field. See [`Session::set_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_color(&mut self, id: PropsId, field: FieldId, color: Color) -> Result<Change, Error> {
        self.set_value(id, field, Value::Color(color))
    }

    /// Sets a float field. See [`Session::set_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_float(&mut self, id: PropsId, field: FieldId, value: f32) -> Result<Change, Error> {
        self.set_value(id, field, Value::Float(value))
    }

    /// Sets an integer field. See [`Session::set_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_int(&mut self, id: PropsId, field: FieldId, value: i32) -> Result<Change, Error> {
        self.set_value(id, field, Value::Int(value))
    }

    /// Sets a texture field. See [`Session::set_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_texture(
        &mut self,
        id: PropsId,
        field: FieldId,
        texture: TextureHandle,
    ) -> Result<Change, Error> {
        self.set_value(id, field, Value::Texture(texture))
    }

    /// Sets a vector field. See [`Session::set_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn set_vector(&mut self, id: PropsId, field: FieldId, vector: Vec4) -> Result<Change, Error> {
        self.set_value(id, field, Value::Vector(vector))
    }

    /// Removes a field from a property set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn remove_field(&mut self, id: PropsId, field: FieldId) -> Result<Change, Error> {
        let change = self.lookup_mut(id)?.remove(field);
        if change.is_changed() {
            tracing::trace!(props = %id, field = %self.names.label(field), "removed field");
        }
        self.route(id, change);
        Ok(change)
    }

    /// Opens a batch on a property set until the end of the frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the set was disposed.
    pub fn begin_batch(&mut self, id: PropsId) -> Result<(), Error> {
        self.lookup_mut(id)?.begin_batch();
        self.schedule(id);
        Ok(())
    }

    /// Disposes a property set.
    ///
    /// The set is first removed from every cascade holding it, so no compiled
    /// output is left listening to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if it was already disposed.
    pub fn dispose_props(&mut self, id: PropsId) -> Result<(), Error> {
        if let Err(err) = self.arena.get(id) {
            tracing::error!(props = %id, "cannot dispose: property set already disposed");
            return Err(err);
        }
        tracing::debug!(props = %id, "disposing property set");
        self.remove_props_everywhere(id);
        self.queue.remove(id);
        self.arena.remove(id);
        debug_assert_eq!(
            self.cache.listener_count(id),
            0,
            "disposed property set still has listeners"
        );
        Ok(())
    }

    /// Removes a property set from every cascade that holds it, dropping
    /// cascades left empty, then sweeps dead consumers.
    ///
    /// Returns how many cascades it was removed from.
    ///
    /// Cascades of dead consumers are skipped; the sweep unregisters them.
    pub fn remove_props_everywhere(&mut self, id: PropsId) -> usize {
        let mut removed = 0;
        let cache = &mut self.cache;
        let arena = &self.arena;
        self.cascades.retain(|consumer, cascade| {
            if !consumer.is_alive() || !cascade.remove(id, consumer, cache, arena) {
                return true;
            }
            removed += 1;
            !cascade.is_empty()
        });
        self.sweep_dead_consumers();
        removed
    }

    fn lookup_mut(&mut self, id: PropsId) -> Result<&mut PropertySet, Error> {
        self.arena.get_mut(id).inspect_err(|err| {
            tracing::error!(%err, "property set used after disposal");
        })
    }

    /// Delivers or defers a change that was just applied to a set.
    fn route(&mut self, id: PropsId, change: Change) {
        if !change.is_changed() {
            return;
        }
        let Ok(set) = self.arena.get_mut(id) else {
            return;
        };
        if set.is_batching() {
            self.schedule(id);
            return;
        }
        if self.config.auto_batch() {
            set.defer(change);
            self.schedule(id);
            return;
        }
        set.take_dirty();
        if let Some(notification) = change.notification() {
            self.cache.notify(id, notification, &self.arena);
            // The apply pass still has to push the result.
            self.request_tick();
        }
    }

    fn schedule(&mut self, id: PropsId) {
        if self.queue.push(id) {
            self.request_tick();
        }
    }

    fn request_tick(&mut self) {
        if !self.tick_requested {
            self.tick_requested = true;
            tracing::trace!("requesting end-of-frame tick");
            self.scheduler.request_end_of_frame();
        }
    }

    // =========================================================================
    // Consumers
    // =========================================================================

    /// Adds a property set to a consumer's cascade.
    ///
    /// Returns `false` if the set was already applied, the consumer is dead
    /// (it is unregistered), or the set was disposed.
    pub fn set(&mut self, consumer: &C, id: PropsId) -> bool {
        self.try_set(consumer, id).unwrap_or(false)
    }

    /// Like [`Session::set`], but reports why nothing happened.
    ///
    /// `Ok(false)` means the set was already applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadConsumer`] if the consumer was destroyed (it is
    /// unregistered), or [`Error::Disposed`] if the set was disposed.
    pub fn try_set(&mut self, consumer: &C, id: PropsId) -> Result<bool, Error> {
        self.ensure_alive(consumer)?;
        let member = match self.arena.get(id) {
            Ok(set) => set.key(),
            Err(err) => {
                tracing::error!(?consumer, %err, "cannot apply a disposed property set");
                return Err(err);
            }
        };
        let cascade = self.cascades.entry(consumer.clone()).or_default();
        let added = cascade.add(member, consumer, &mut self.cache, &self.arena);
        if added {
            tracing::debug!(?consumer, props = %id, "applied property set");
        }
        Ok(added)
    }

    /// Removes a property set from a consumer's cascade.
    ///
    /// A cascade left empty is dropped. Returns `false` if the set was not
    /// applied or the consumer is dead (it is unregistered).
    pub fn remove(&mut self, consumer: &C, id: PropsId) -> bool {
        self.try_remove(consumer, id).unwrap_or(false)
    }

    /// Like [`Session::remove`], but reports a dead consumer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadConsumer`] if the consumer was destroyed (it is
    /// unregistered).
    pub fn try_remove(&mut self, consumer: &C, id: PropsId) -> Result<bool, Error> {
        self.ensure_alive(consumer)?;
        let Some(cascade) = self.cascades.get_mut(consumer) else {
            return Ok(false);
        };
        if !cascade.remove(id, consumer, &mut self.cache, &self.arena) {
            return Ok(false);
        }
        tracing::debug!(?consumer, props = %id, "removed property set");
        if cascade.is_empty() {
            self.cascades.remove(consumer);
        }
        Ok(true)
    }

    /// Drops a consumer's cascade entirely. Returns `false` if it had none.
    ///
    /// A consumer that is still alive receives the neutral block.
    pub fn unregister(&mut self, consumer: &C) -> bool {
        let Some(mut cascade) = self.cascades.remove(consumer) else {
            return false;
        };
        tracing::debug!(?consumer, alive = consumer.is_alive(), "unregistering consumer");
        cascade.unbind(consumer, &mut self.cache);
        true
    }

    /// Unregisters every consumer the host destroyed. Returns how many.
    pub fn sweep_dead_consumers(&mut self) -> usize {
        let dead: Vec<C> = self
            .cascades
            .keys()
            .filter(|consumer| !consumer.is_alive())
            .cloned()
            .collect();
        for consumer in &dead {
            self.unregister(consumer);
        }
        if !dead.is_empty() {
            tracing::debug!(count = dead.len(), "swept dead consumers");
        }
        dead.len()
    }

    fn ensure_alive(&mut self, consumer: &C) -> Result<(), Error> {
        if consumer.is_alive() {
            return Ok(());
        }
        tracing::warn!(?consumer, "cannot modify cascade of a destroyed consumer");
        self.unregister(consumer);
        Err(Error::DeadConsumer)
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Runs the end-of-frame work. Call it once per frame after all updates.
    pub fn tick(&mut self) -> TickReport {
        self.tick_requested = false;
        let mut report = TickReport::default();
        if self.config.sweep_every_tick() {
            report.pruned += self.sweep_dead_consumers();
        }

        for id in self.queue.take() {
            let Ok(set) = self.arena.get_mut(id) else {
                continue;
            };
            report.flushed += 1;
            if let Some(notification) = set.finish_batch() {
                self.cache.notify(id, notification, &self.arena);
            }
        }

        let mut dead = Vec::new();
        self.cache.apply_all(&mut dead);
        if !dead.is_empty() {
            for consumer in &dead {
                if self.unregister(consumer) {
                    report.pruned += 1;
                }
            }
            report.pruned += self.sweep_dead_consumers();
        }
        report
    }

    /// Returns `true` if an end-of-frame tick was requested and has not run.
    #[must_use]
    pub fn is_tick_requested(&self) -> bool {
        self.tick_requested
    }

    /// Returns the number of property sets waiting for the next tick.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Releases everything the session owns.
    ///
    /// Every cascade is dropped (alive consumers receive the neutral block),
    /// then any compiled output that is somehow still alive is force-disposed.
    /// Leftovers are reported with a warning and in the returned report. The
    /// session is empty and reusable afterwards.
    pub fn teardown(&mut self) -> TeardownReport {
        let report = TeardownReport {
            cascades: self.cascades.len(),
            outputs: self.cache.len(),
            props: self.arena.len(),
        };
        if !self.cache.is_empty() {
            tracing::warn!(
                count = report.outputs,
                "compiled outputs still in use at teardown; forcing disposal"
            );
        }

        let consumers: Vec<C> = self.cascades.keys().cloned().collect();
        for consumer in &consumers {
            self.unregister(consumer);
        }
        let leaked = self.cache.force_clear();
        if leaked > 0 {
            tracing::error!(count = leaked, "compiled outputs survived releasing every cascade");
        }

        if report.props > 0 {
            tracing::warn!(count = report.props, "property sets were never disposed");
        }
        self.arena.clear();
        self.queue.take();
        self.tick_requested = false;
        tracing::debug!(?report, "session torn down");
        report
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns a consumer's cascade.
    #[must_use]
    pub fn cascade(&self, consumer: &C) -> Option<&Cascade> {
        self.cascades.get(consumer)
    }

    /// Returns the number of registered consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.cascades.len()
    }

    /// Returns the compiled output a consumer is bound to.
    #[must_use]
    pub fn output_for(&self, consumer: &C) -> Option<&CompiledOutput<C>> {
        let id = self.cascades.get(consumer)?.output()?;
        self.cache.get(id)
    }

    /// Returns the compiled output shared by cascades with this membership.
    #[must_use]
    pub fn output_for_key(&self, key: &CascadeKey) -> Option<&CompiledOutput<C>> {
        self.cache.get(self.cache.lookup(key)?)
    }

    /// Returns a compiled output by id.
    #[must_use]
    pub fn output(&self, id: OutputId) -> Option<&CompiledOutput<C>> {
        self.cache.get(id)
    }

    /// Iterates live compiled outputs.
    pub fn outputs(&self) -> impl Iterator<Item = &CompiledOutput<C>> + '_ {
        self.cache.iter()
    }

    /// Returns the number of live compiled outputs.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.cache.len()
    }

    /// Returns the number of compiled outputs listening to a property set.
    #[must_use]
    pub fn listener_count(&self, id: PropsId) -> usize {
        self.cache.listener_count(id)
    }
}
