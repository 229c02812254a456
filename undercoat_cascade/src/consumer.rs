// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts with the host.

use core::fmt::Debug;
use core::hash::Hash;

use undercoat_props::PropertyBlock;

/// A host object that receives compiled output, such as a renderer.
///
/// Implementors are cheap handles: cloning a consumer must yield another
/// handle to the same host object, and equality/hashing must follow host
/// identity. A handle must stay valid to query after the host object is
/// destroyed, so that [`Consumer::is_alive`] can report it.
///
/// # Example
///
/// ```rust
/// use std::cell::{Cell, RefCell};
/// use std::rc::Rc;
/// use undercoat_cascade::Consumer;
/// use undercoat_props::PropertyBlock;
///
/// #[derive(Debug, Default)]
/// struct MeshRenderer {
///     alive: Cell<bool>,
///     block: RefCell<PropertyBlock>,
/// }
///
/// #[derive(Clone, Debug)]
/// struct RendererRef(Rc<MeshRenderer>);
///
/// impl PartialEq for RendererRef {
///     fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
/// }
/// impl Eq for RendererRef {}
/// impl std::hash::Hash for RendererRef {
///     fn hash<H: std::hash::Hasher>(&self, state: &mut H) { Rc::as_ptr(&self.0).hash(state) }
/// }
///
/// impl Consumer for RendererRef {
///     fn apply_output(&self, block: &PropertyBlock) {
///         *self.0.block.borrow_mut() = block.clone();
///     }
///     fn is_alive(&self) -> bool { self.0.alive.get() }
/// }
/// ```
pub trait Consumer: Clone + Eq + Hash + Debug {
    /// Replaces whatever output was previously applied with `block`.
    ///
    /// An empty block means "no overrides".
    fn apply_output(&self, block: &PropertyBlock);

    /// Returns `false` once the host has destroyed the object.
    fn is_alive(&self) -> bool;

    /// Inactive consumers stay registered but are skipped when output is
    /// applied; they catch up once active again.
    fn is_active(&self) -> bool {
        true
    }
}

/// One-shot "run once at the end of this frame" primitive.
///
/// A [`Session`](crate::Session) calls [`FrameScheduler::request_end_of_frame`]
/// at most once per frame, when the first property set gets queued. The host
/// answers by calling [`Session::tick`](crate::Session::tick) after all of the
/// frame's updates and before presentation.
///
/// Any `FnMut()` closure is a scheduler.
pub trait FrameScheduler {
    /// Asks the host to call `tick` at the end of the current frame.
    fn request_end_of_frame(&mut self);
}

impl<F: FnMut()> FrameScheduler for F {
    fn request_end_of_frame(&mut self) {
        self();
    }
}
