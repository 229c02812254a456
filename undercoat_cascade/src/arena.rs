// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage for the property sets of a session.

use hashbrown::HashMap;
use undercoat_props::{PropertySet, PropsId};

use crate::error::Error;

/// Owns every live [`PropertySet`]; everything else refers to them by
/// [`PropsId`].
///
/// Serials increase monotonically and are never reused, so a stale id keeps
/// failing with [`Error::Disposed`] instead of aliasing a newer set.
#[derive(Clone, Debug, Default)]
pub(crate) struct PropsArena {
    sets: HashMap<PropsId, PropertySet>,
    next_serial: u64,
}

impl PropsArena {
    pub(crate) fn create(&mut self, priority: i32) -> PropsId {
        let id = PropsId::from_serial(self.next_serial);
        self.next_serial += 1;
        self.sets.insert(id, PropertySet::new(id, priority));
        id
    }

    pub(crate) fn get(&self, id: PropsId) -> Result<&PropertySet, Error> {
        self.sets.get(&id).ok_or(Error::Disposed(id))
    }

    pub(crate) fn get_mut(&mut self, id: PropsId) -> Result<&mut PropertySet, Error> {
        self.sets.get_mut(&id).ok_or(Error::Disposed(id))
    }

    pub(crate) fn remove(&mut self, id: PropsId) -> Option<PropertySet> {
        self.sets.remove(&id)
    }

    pub(crate) fn contains(&self, id: PropsId) -> bool {
        self.sets.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.sets.len()
    }

    pub(crate) fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut arena = PropsArena::default();
        let a = arena.create(0);
        assert!(arena.remove(a).is_some());
        let b = arena.create(0);
        assert_ne!(a, b);
        assert_eq!(arena.get(a).err(), Some(Error::Disposed(a)));
        assert_eq!(arena.get(b).map(PropertySet::priority), Ok(0));
    }

    #[test]
    fn create_stores_priority() {
        let mut arena = PropsArena::default();
        let id = arena.create(7);
        assert_eq!(arena.get(id).map(PropertySet::priority), Ok(7));
        assert!(arena.contains(id));
        assert_eq!(arena.len(), 1);
    }
}
