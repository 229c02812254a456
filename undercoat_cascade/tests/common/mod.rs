// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test fixtures.

#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::cell::{Cell, RefCell};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use undercoat_cascade::{Consumer, Session, SessionConfig};
use undercoat_props::{FieldId, PropertyBlock};

#[derive(Debug, Default)]
pub(crate) struct RendererState {
    alive: Cell<bool>,
    inactive: Cell<bool>,
    block: RefCell<PropertyBlock>,
    applies: Cell<usize>,
}

/// A fake renderer that records what it was given.
#[derive(Clone, Debug)]
pub(crate) struct Renderer(Rc<RendererState>);

impl Renderer {
    pub(crate) fn new() -> Self {
        let state = RendererState::default();
        state.alive.set(true);
        Self(Rc::new(state))
    }

    pub(crate) fn destroy(&self) {
        self.0.alive.set(false);
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.0.inactive.set(!active);
    }

    pub(crate) fn block(&self) -> PropertyBlock {
        self.0.block.borrow().clone()
    }

    pub(crate) fn float(&self, field: FieldId) -> Option<f32> {
        self.0.block.borrow().float(field)
    }

    pub(crate) fn applies(&self) -> usize {
        self.0.applies.get()
    }
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Renderer {}

impl Hash for Renderer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl Consumer for Renderer {
    fn apply_output(&self, block: &PropertyBlock) {
        *self.0.block.borrow_mut() = block.clone();
        self.0.applies.set(self.0.applies.get() + 1);
    }

    fn is_alive(&self) -> bool {
        self.0.alive.get()
    }

    fn is_active(&self) -> bool {
        !self.0.inactive.get()
    }
}

/// A session whose scheduler counts end-of-frame requests.
pub(crate) fn session(config: SessionConfig) -> (Session<Renderer>, Rc<Cell<usize>>) {
    let requests = Rc::new(Cell::new(0));
    let counter = requests.clone();
    let session = Session::new(config, move || counter.set(counter.get() + 1));
    (session, requests)
}

pub(crate) fn default_session() -> Session<Renderer> {
    session(SessionConfig::default()).0
}
