// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prioritized, change-tracking property sets.
//!
//! A [`PropertySet`] is the bag of field values one behavior contributes. It
//! knows nothing about cascades or consumers; it only classifies each mutation
//! as a [`Change`] and, while a batch is open, folds changes into sticky flags
//! that are later released as a single [`Notification`].
//!
//! # Storage
//!
//! Entries live in a sorted `SmallVec` and are found by binary search. Sets
//! typically carry a handful of fields, so the first few are stored inline.

use core::fmt;

use smallvec::SmallVec;

use crate::block::PropertyBlock;
use crate::error::PropsError;
use crate::id::{FieldId, PropsId, PropsKey};
use crate::tolerance::Tolerance;
use crate::value::{Value, ValueKind};

/// Inline capacity for field entries.
const INLINE_CAPACITY: usize = 8;

/// Classification of a single mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// Nothing observable changed.
    Unchanged,
    /// An existing field got a new value of the same tag.
    Value(FieldId),
    /// The field set changed: a field was added, removed, or retagged.
    Entries,
}

impl Change {
    /// Returns `true` for anything but [`Change::Unchanged`].
    #[must_use]
    #[inline]
    pub fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The notification to send when this change is delivered eagerly.
    #[must_use]
    pub fn notification(self) -> Option<Notification> {
        match self {
            Self::Unchanged => None,
            Self::Value(field) => Some(Notification::ValueChanged(Some(field))),
            Self::Entries => Some(Notification::EntriesChanged),
        }
    }
}

/// What listeners of a property set are told.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The set of defined fields changed; ownership must be recomputed.
    EntriesChanged,
    /// Values changed. `Some(field)` scopes the change to one field; `None`
    /// means "re-scan every field this set owns".
    ValueChanged(Option<FieldId>),
}

/// A mutable, prioritized map from [`FieldId`] to [`Value`].
///
/// # Batching
///
/// A new set starts inside a batch. While a batch is open, mutations only set
/// sticky "needs entries update" / "needs value update" flags; the owner of the
/// set is expected to call [`PropertySet::finish_batch`] once at the end of the
/// frame, which yields at most one [`Notification`] for any number of changes.
/// Outside a batch, the [`Change`] returned by a mutation is meant to be
/// delivered right away.
///
/// # Example
///
/// ```rust
/// use undercoat_props::{
///     Change, FieldId, Notification, PropertySet, PropsId, Tolerance, Value,
/// };
///
/// let opacity = FieldId::new(1);
/// let tint = FieldId::new(2);
/// let tol = Tolerance::DEFAULT;
///
/// let mut set = PropertySet::new(PropsId::from_serial(0), 10);
/// assert!(set.is_batching());
///
/// assert_eq!(set.set(opacity, Value::Float(0.5), &tol), Change::Entries);
/// assert_eq!(set.set(tint, Value::Float(1.0), &tol), Change::Entries);
/// assert_eq!(set.set(opacity, Value::Float(0.25), &tol), Change::Value(opacity));
///
/// // Three changes, one notification.
/// assert_eq!(set.finish_batch(), Some(Notification::EntriesChanged));
/// assert!(!set.is_batching());
///
/// // Setting an equal value is a no-op.
/// assert_eq!(set.set(opacity, Value::Float(0.25), &tol), Change::Unchanged);
/// assert!(!set.is_dirty());
/// ```
#[derive(Clone, Debug)]
pub struct PropertySet {
    key: PropsKey,
    /// Sorted by [`FieldId`] for binary search lookup.
    entries: SmallVec<[(FieldId, Value); INLINE_CAPACITY]>,
    /// Fields changed since the dirty state was last consumed, sorted.
    dirty_fields: SmallVec<[FieldId; INLINE_CAPACITY]>,
    /// Aggregate dirty flag; also set by removals, which leave no field behind.
    dirty: bool,
    batching: bool,
    needs_entries_update: bool,
    needs_value_update: bool,
}

impl PropertySet {
    /// Creates an empty set with the given identity and priority.
    ///
    /// The set starts inside a batch, so that filling it right after
    /// construction produces a single notification.
    #[must_use]
    pub fn new(id: PropsId, priority: i32) -> Self {
        Self {
            key: PropsKey::new(priority, id),
            entries: SmallVec::new(),
            dirty_fields: SmallVec::new(),
            dirty: false,
            batching: true,
            needs_entries_update: false,
            needs_value_update: false,
        }
    }

    /// Returns the identity of this set.
    #[must_use]
    #[inline]
    pub fn id(&self) -> PropsId {
        self.key.id
    }

    /// Returns the priority of this set.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> i32 {
        self.key.priority
    }

    /// Returns the cascade ordering key `(priority, id)`.
    #[must_use]
    #[inline]
    pub fn key(&self) -> PropsKey {
        self.key
    }

    /// Returns the number of defined fields.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no fields are defined.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the defined fields in ascending order.
    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Iterates `(field, value)` pairs in ascending field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &Value)> + '_ {
        self.entries.iter().map(|(id, v)| (*id, v))
    }

    #[inline]
    fn find(&self, field: FieldId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&field, |(id, _)| *id)
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.find(field).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if the field is defined, whatever its tag.
    #[must_use]
    pub fn contains(&self, field: FieldId) -> bool {
        self.find(field).is_ok()
    }

    fn has_kind(&self, field: FieldId, kind: ValueKind) -> bool {
        self.get(field).is_some_and(|v| v.kind() == kind)
    }

    /// Returns `true` if the field holds a color.
    #[must_use]
    pub fn has_color(&self, field: FieldId) -> bool {
        self.has_kind(field, ValueKind::Color)
    }

    /// Returns `true` if the field holds a float.
    #[must_use]
    pub fn has_float(&self, field: FieldId) -> bool {
        self.has_kind(field, ValueKind::Float)
    }

    /// Returns `true` if the field holds an integer.
    #[must_use]
    pub fn has_int(&self, field: FieldId) -> bool {
        self.has_kind(field, ValueKind::Int)
    }

    /// Returns `true` if the field holds a texture.
    #[must_use]
    pub fn has_texture(&self, field: FieldId) -> bool {
        self.has_kind(field, ValueKind::Texture)
    }

    /// Returns `true` if the field holds a vector.
    #[must_use]
    pub fn has_vector(&self, field: FieldId) -> bool {
        self.has_kind(field, ValueKind::Vector)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Inserts or updates a field.
    ///
    /// - absent field: [`Change::Entries`]
    /// - present with another tag: overwritten with a warning, [`Change::Entries`]
    /// - present and approximately equal under `tolerance`: [`Change::Unchanged`]
    /// - otherwise: [`Change::Value`]
    ///
    /// While a batch is open the change is also folded into the pending flags.
    pub fn set(&mut self, field: FieldId, value: Value, tolerance: &Tolerance) -> Change {
        let change = match self.find(field) {
            Err(idx) => {
                self.entries.insert(idx, (field, value));
                Change::Entries
            }
            Ok(idx) => {
                let stored = &mut self.entries[idx].1;
                if stored.kind() != value.kind() {
                    tracing::warn!(
                        props = %self.key.id,
                        %field,
                        from = %stored.kind(),
                        to = %value.kind(),
                        "field has mismatched type; overwriting"
                    );
                    *stored = value;
                    Change::Entries
                } else if tolerance.value_eq(stored, &value) {
                    Change::Unchanged
                } else {
                    *stored = value;
                    Change::Value(field)
                }
            }
        };

        if change.is_changed() {
            tracing::trace!(props = %self.key.id, %field, %value, "setting field");
            self.mark_field_dirty(field);
            self.record(change);
        }
        change
    }

    /// Removes a field. Returns [`Change::Entries`] if it was defined.
    pub fn remove(&mut self, field: FieldId) -> Change {
        let Ok(idx) = self.find(field) else {
            return Change::Unchanged;
        };
        self.entries.remove(idx);
        self.dirty = true;
        if let Ok(pos) = self.dirty_fields.binary_search(&field) {
            self.dirty_fields.remove(pos);
        }
        self.record(Change::Entries);
        Change::Entries
    }

    fn mark_field_dirty(&mut self, field: FieldId) {
        self.dirty = true;
        if let Err(pos) = self.dirty_fields.binary_search(&field) {
            self.dirty_fields.insert(pos, field);
        }
    }

    fn record(&mut self, change: Change) {
        if !self.batching {
            return;
        }
        match change {
            Change::Unchanged => {}
            Change::Value(_) => self.needs_value_update = true,
            Change::Entries => self.needs_entries_update = true,
        }
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    /// Returns `true` if anything changed since the dirty state was consumed.
    #[must_use]
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns `true` if the field changed since the dirty state was consumed.
    #[must_use]
    pub fn is_field_dirty(&self, field: FieldId) -> bool {
        self.dirty_fields.binary_search(&field).is_ok()
    }

    /// Iterates the fields changed since the dirty state was consumed.
    pub fn dirty_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.dirty_fields.iter().copied()
    }

    /// Consumes the dirty state. Returns whether it was dirty.
    pub fn take_dirty(&mut self) -> bool {
        self.dirty_fields.clear();
        core::mem::take(&mut self.dirty)
    }

    // =========================================================================
    // Batching
    // =========================================================================

    /// Returns `true` while a batch is open.
    #[must_use]
    #[inline]
    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Returns `true` if a batch holds changes that were not yet delivered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.needs_entries_update || self.needs_value_update
    }

    /// Opens a batch. Returns `false` if one was already open.
    pub fn begin_batch(&mut self) -> bool {
        !core::mem::replace(&mut self.batching, true)
    }

    /// Opens a batch (if needed) and folds in a change that was already
    /// applied outside of it.
    ///
    /// This lets a coordinator decide to defer delivery after seeing the
    /// [`Change`] a mutation returned. Returns `true` if a batch was opened.
    pub fn defer(&mut self, change: Change) -> bool {
        let opened = self.begin_batch();
        self.record(change);
        opened
    }

    /// Closes the batch and returns the coalesced notification, if any.
    ///
    /// Structural changes win over value changes; a value-only batch is
    /// reported as [`Notification::ValueChanged`] with no field, since more
    /// than one field may be involved. The dirty state is consumed.
    pub fn finish_batch(&mut self) -> Option<Notification> {
        let notification = if self.needs_entries_update {
            Some(Notification::EntriesChanged)
        } else if self.needs_value_update {
            Some(Notification::ValueChanged(None))
        } else {
            None
        };
        self.batching = false;
        self.needs_entries_update = false;
        self.needs_value_update = false;
        self.take_dirty();
        notification
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Writes one field into a block.
    ///
    /// # Errors
    ///
    /// Returns [`PropsError::FieldNotFound`] if the field is not defined.
    pub fn write(&self, field: FieldId, block: &mut PropertyBlock) -> Result<(), PropsError> {
        let value = self.get(field).ok_or(PropsError::FieldNotFound { field })?;
        block.set(field, *value);
        Ok(())
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(Priority {}) {{", self.key.priority)?;
        for (field, value) in &self.entries {
            writeln!(f, "{field} = {value}")?;
        }
        f.write_str("}")
    }
}
