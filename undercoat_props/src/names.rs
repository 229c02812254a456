// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field name registry for diagnostics.
//!
//! Field ids are plain integers; [`FieldNames`] maps them back to readable
//! parameter names so log lines say `_Opacity` instead of `<7>`.

use alloc::string::{String, ToString};
use core::fmt;

use hashbrown::HashMap;

use crate::id::FieldId;

/// Parameter names seeded by [`FieldNames::with_common`].
pub const COMMON_FIELD_NAMES: &[&str] = &[
    "TransparentFX",
    "_BumpMap",
    "_Color",
    "_EmissiveColor",
    "_MainTex",
    "_MaxX",
    "_MaxY",
    "_MinX",
    "_MinY",
    "_Multiplier",
    "_Opacity",
    "_RimColor",
    "_RimFalloff",
    "_TC1Color",
    "_TC1MetalBlend",
    "_TC1Metalness",
    "_TC1SmoothBlend",
    "_TC1Smoothness",
    "_TC2Color",
    "_TC2MetalBlend",
    "_TC2Metalness",
    "_TC2SmoothBlend",
    "_TC2Smoothness",
    "_TemperatureColor",
    "_Tex",
    "_Tint",
    "_TintColor",
    "_subdiv",
    "localMatrix",
    "upMatrix",
];

/// A bidirectional name ↔ [`FieldId`] registry.
///
/// Names can be interned (the registry hands out the next free id) or bound
/// to an id chosen by the host (for hosts that already hash parameter names).
///
/// # Example
///
/// ```rust
/// use undercoat_props::{FieldId, FieldNames};
///
/// let mut names = FieldNames::new();
/// let color = names.intern("_Color");
/// assert_eq!(names.intern("_Color"), color);
/// assert_eq!(names.name(color), Some("_Color"));
///
/// // Unknown ids render as `<id>`.
/// assert_eq!(names.label(FieldId::new(999)).to_string(), "<999>");
/// assert_eq!(names.label(color).to_string(), "_Color");
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldNames {
    by_name: HashMap<String, FieldId>,
    by_id: HashMap<FieldId, String>,
    next: i32,
}

impl FieldNames {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with [`COMMON_FIELD_NAMES`].
    #[must_use]
    pub fn with_common() -> Self {
        let mut names = Self::new();
        for name in COMMON_FIELD_NAMES {
            names.intern(name);
        }
        names
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns the id for `name`, assigning a fresh one if needed.
    pub fn intern(&mut self, name: &str) -> FieldId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        while self.by_id.contains_key(&FieldId::new(self.next)) {
            self.advance();
        }
        let id = FieldId::new(self.next);
        self.advance();
        self.bind(id, name);
        id
    }

    /// Moves to the next candidate id, wrapping around once `i32` is used up.
    fn advance(&mut self) {
        self.next = self.next.checked_add(1).unwrap_or_else(|| {
            tracing::error!("field ids exhausted; wrapping around to reuse free ids");
            i32::MIN
        });
    }

    /// Binds `name` to a host-chosen id, replacing any previous binding of
    /// either side.
    pub fn bind(&mut self, id: FieldId, name: &str) {
        if let Some(old) = self.by_id.insert(id, name.to_string()) {
            self.by_name.remove(old.as_str());
        }
        if let Some(old_id) = self.by_name.insert(name.to_string(), id)
            && old_id != id
        {
            self.by_id.remove(&old_id);
        }
    }

    /// Looks up the id registered for a name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// Looks up the name registered for an id.
    #[must_use]
    pub fn name(&self, id: FieldId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Returns a displayable label: the registered name, else `<id>`.
    #[must_use]
    pub fn label(&self, id: FieldId) -> FieldLabel<'_> {
        FieldLabel {
            id,
            name: self.name(id),
        }
    }
}

/// Display adapter returned by [`FieldNames::label`].
#[derive(Copy, Clone, Debug)]
pub struct FieldLabel<'a> {
    id: FieldId,
    name: Option<&'a str>,
}

impl fmt::Display for FieldLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => f.write_str(name),
            None => fmt::Display::fmt(&self.id, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let mut names = FieldNames::new();
        let a = names.intern("_Color");
        let b = names.intern("_Opacity");
        assert_ne!(a, b);
        assert_eq!(names.intern("_Color"), a);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn common_names_are_seeded() {
        let names = FieldNames::with_common();
        assert_eq!(names.len(), COMMON_FIELD_NAMES.len());
        let opacity = names.id("_Opacity").unwrap();
        assert_eq!(names.name(opacity), Some("_Opacity"));
    }

    #[test]
    fn bind_uses_host_ids_and_intern_skips_them() {
        let mut names = FieldNames::new();
        names.bind(FieldId::new(0), "_HostColor");
        let next = names.intern("_Fresh");
        assert_ne!(next, FieldId::new(0));
        assert_eq!(names.id("_HostColor"), Some(FieldId::new(0)));
    }

    #[test]
    fn rebinding_replaces_both_directions() {
        let mut names = FieldNames::new();
        names.bind(FieldId::new(5), "_A");
        names.bind(FieldId::new(5), "_B");
        assert_eq!(names.id("_A"), None);
        assert_eq!(names.name(FieldId::new(5)), Some("_B"));

        names.bind(FieldId::new(6), "_B");
        assert_eq!(names.name(FieldId::new(5)), None);
        assert_eq!(names.id("_B"), Some(FieldId::new(6)));
    }

    #[test]
    fn intern_wraps_past_the_last_id() {
        let mut names = FieldNames::new();
        names.next = i32::MAX;
        assert_eq!(names.intern("_Last"), FieldId::new(i32::MAX));
        assert_eq!(names.intern("_Wrapped"), FieldId::new(i32::MIN));
        assert_eq!(names.name(FieldId::new(i32::MAX)), Some("_Last"));
    }

    #[test]
    fn label_falls_back_to_raw_id() {
        let names = FieldNames::new();
        assert_eq!(names.label(FieldId::new(3)).to_string(), "<3>");
    }
}
