// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identification types.
//!
//! This module provides [`FieldId`] for naming parameter slots, [`PropsId`] for
//! the stable identity of a [`PropertySet`](crate::PropertySet), and
//! [`PropsKey`], the `(priority, identity)` pair that orders sets in a cascade.

use core::fmt;

/// A parameter slot identifier.
///
/// A small integer naming a shader-like parameter (`_Color`, `_Opacity`, ...).
/// It is only meaningful in combination with the value stored under it; the
/// same id may hold a color in one set and a float in another.
///
/// Names for debug output are kept in a [`FieldNames`](crate::FieldNames)
/// registry, not in the id itself.
///
/// # Example
///
/// ```rust
/// use undercoat_props::FieldId;
///
/// let id = FieldId::new(42);
/// assert_eq!(id.raw(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(i32);

impl FieldId {
    /// Creates a field id from a raw integer.
    #[must_use]
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer of this field id.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldId").field(&self.0).finish()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// Stable identity of a property set.
///
/// Identities are handed out in increasing order and never reused within a
/// session. They break ties between sets of equal priority and are never a
/// priority themselves.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropsId(u64);

impl PropsId {
    /// Creates an identity from its serial number.
    ///
    /// This is typically called by the owner of the property set arena
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn from_serial(serial: u64) -> Self {
        Self(serial)
    }

    /// Returns the serial number of this identity.
    #[must_use]
    #[inline]
    pub const fn serial(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PropsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropsId({})", self.0)
    }
}

impl fmt::Display for PropsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "props#{}", self.0)
    }
}

/// Cascade ordering key of a property set.
///
/// Keys compare by `(priority, id)`: lower priorities sort first and are
/// applied first, so later (higher) keys win field conflicts. Because ids are
/// unique, two keys are equal exactly when they name the same property set.
///
/// ```rust
/// use undercoat_props::{PropsId, PropsKey};
///
/// let low = PropsKey::new(0, PropsId::from_serial(7));
/// let high = PropsKey::new(10, PropsId::from_serial(1));
/// let tie = PropsKey::new(10, PropsId::from_serial(2));
///
/// assert!(low < high);
/// assert!(high < tie);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropsKey {
    /// Priority given at construction. Field order matters for `Ord`.
    pub priority: i32,
    /// Identity used as tie-breaker.
    pub id: PropsId,
}

impl PropsKey {
    /// Creates a new ordering key.
    #[must_use]
    #[inline]
    pub const fn new(priority: i32, id: PropsId) -> Self {
        Self { priority, id }
    }
}
