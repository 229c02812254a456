// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merged output container.
//!
//! A [`PropertyBlock`] is what consumers receive: one value per field, with no
//! priority information left. Entries are kept sorted by [`FieldId`] for
//! binary search, the same layout [`PropertySet`](crate::PropertySet) uses.

use alloc::vec::Vec;

use crate::id::FieldId;
use crate::value::{Color, TextureHandle, Value, Vec4};

/// A flat, sorted map from field to value.
///
/// # Example
///
/// ```rust
/// use undercoat_props::{FieldId, PropertyBlock, Value};
///
/// let opacity = FieldId::new(1);
///
/// let mut block = PropertyBlock::new();
/// assert!(block.is_empty());
///
/// block.set(opacity, Value::Float(0.5));
/// assert_eq!(block.float(opacity), Some(0.5));
/// assert_eq!(block.len(), 1);
///
/// block.clear();
/// assert!(block.get(opacity).is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBlock {
    entries: Vec<(FieldId, Value)>,
}

impl PropertyBlock {
    /// The neutral block: no overrides at all.
    pub const EMPTY: Self = Self {
        entries: Vec::new(),
    };

    /// Creates an empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Returns `true` if the block holds no fields.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of fields in the block.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn find(&self, field: FieldId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&field, |(id, _)| *id)
    }

    /// Returns the value stored for a field.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.find(field).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if the field is present.
    #[must_use]
    pub fn contains(&self, field: FieldId) -> bool {
        self.find(field).is_ok()
    }

    /// Inserts or replaces the value for a field.
    pub fn set(&mut self, field: FieldId, value: Value) {
        match self.find(field) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (field, value)),
        }
    }

    /// Removes a field. Returns `true` if it was present.
    pub fn remove(&mut self, field: FieldId) -> bool {
        if let Ok(idx) = self.find(field) {
            self.entries.remove(idx);
            true
        } else {
            false
        }
    }

    /// Removes every field, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &Value)> + '_ {
        self.entries.iter().map(|(id, v)| (*id, v))
    }

    /// Iterates the fields present in the block, in order.
    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Returns the color stored for a field, if it is a color.
    #[must_use]
    pub fn color(&self, field: FieldId) -> Option<Color> {
        self.get(field).and_then(Value::as_color)
    }

    /// Returns the float stored for a field, if it is a float.
    #[must_use]
    pub fn float(&self, field: FieldId) -> Option<f32> {
        self.get(field).and_then(Value::as_float)
    }

    /// Returns the integer stored for a field, if it is an integer.
    #[must_use]
    pub fn int(&self, field: FieldId) -> Option<i32> {
        self.get(field).and_then(Value::as_int)
    }

    /// Returns the texture stored for a field, if it is a texture.
    #[must_use]
    pub fn texture(&self, field: FieldId) -> Option<TextureHandle> {
        self.get(field).and_then(Value::as_texture)
    }

    /// Returns the vector stored for a field, if it is a vector.
    #[must_use]
    pub fn vector(&self, field: FieldId) -> Option<Vec4> {
        self.get(field).and_then(Value::as_vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn keeps_fields_sorted() {
        let mut block = PropertyBlock::new();
        block.set(FieldId::new(30), Value::Int(3));
        block.set(FieldId::new(-4), Value::Int(1));
        block.set(FieldId::new(10), Value::Int(2));

        let fields: Vec<_> = block.fields().map(FieldId::raw).collect();
        assert_eq!(fields, [-4, 10, 30]);
    }

    #[test]
    fn set_replaces_in_place() {
        let field = FieldId::new(5);
        let mut block = PropertyBlock::new();
        block.set(field, Value::Int(1));
        block.set(field, Value::Float(2.0));
        assert_eq!(block.len(), 1);
        assert_eq!(block.float(field), Some(2.0));
        assert_eq!(block.int(field), None);
    }

    #[test]
    fn remove_reports_presence() {
        let field = FieldId::new(5);
        let mut block = PropertyBlock::new();
        assert!(!block.remove(field));
        block.set(field, Value::Int(1));
        assert!(block.contains(field));
        assert!(block.remove(field));
        assert!(block.is_empty());
    }

    #[test]
    fn empty_constant_is_empty() {
        assert!(PropertyBlock::EMPTY.is_empty());
        assert_eq!(PropertyBlock::new(), PropertyBlock::default());
    }
}
