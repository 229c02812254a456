// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undercoat Cascade: shared, cached compilation of layered property sets.
//!
//! Many independent behaviors each want to override a few rendering
//! parameters on many host objects. Each behavior owns a
//! [`PropertySet`](undercoat_props::PropertySet) with a priority; each host
//! object (a [`Consumer`]) has a [`Cascade`] of the sets applied to it. This
//! crate merges cascades into [`CompiledOutput`]s and keeps them current
//! while doing as little work as possible:
//!
//! - **Deduplication**: consumers whose cascades hold the same sets share one
//!   compiled output, built once and reference-counted.
//! - **Ownership**: within an output, each field belongs to the highest
//!   `(priority, id)` member defining it, so a value change from any other
//!   member costs nothing.
//! - **Batching**: changes are collected per frame and delivered once per
//!   set at the end of the frame by [`Session::tick`].
//! - **Lifetime**: consumers destroyed by the host are pruned, and
//!   [`Session::teardown`] audits leaks.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use undercoat_cascade::{Consumer, Session, SessionConfig};
//! use undercoat_props::PropertyBlock;
//!
//! #[derive(Clone, Debug, Default)]
//! struct Renderer(Rc<RefCell<PropertyBlock>>);
//!
//! impl PartialEq for Renderer {
//!     fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
//! }
//! impl Eq for Renderer {}
//! impl std::hash::Hash for Renderer {
//!     fn hash<H: std::hash::Hasher>(&self, state: &mut H) { Rc::as_ptr(&self.0).hash(state) }
//! }
//! impl Consumer for Renderer {
//!     fn apply_output(&self, block: &PropertyBlock) { *self.0.borrow_mut() = block.clone(); }
//!     fn is_alive(&self) -> bool { true }
//! }
//!
//! let mut session = Session::new(SessionConfig::default(), || {});
//! let opacity = session.field_names_mut().intern("_Opacity");
//!
//! let base = session.create_props(0);
//! let fade = session.create_props(10);
//! session.set_float(base, opacity, 1.0).unwrap();
//! session.set_float(fade, opacity, 0.25).unwrap();
//!
//! let a = Renderer::default();
//! let b = Renderer::default();
//! for renderer in [&a, &b] {
//!     session.set(renderer, base);
//!     session.set(renderer, fade);
//! }
//! session.tick();
//!
//! // Same membership, one shared output; the higher priority wins.
//! assert_eq!(session.output_count(), 1);
//! assert_eq!(a.0.borrow().float(opacity), Some(0.25));
//! assert_eq!(b.0.borrow().float(opacity), Some(0.25));
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]: usage errors at `error`, leaks and
//! dead-consumer misuse at `warn`, cache and lifetime events at `debug`, and
//! per-field traffic at `trace`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod arena;
mod cache;
mod cascade;
mod compiled;
mod config;
mod consumer;
mod error;
mod queue;
mod session;

pub use cascade::{Cascade, CascadeKey};
pub use compiled::{CompiledOutput, OutputId, OutputStats};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use consumer::{Consumer, FrameScheduler};
pub use error::Error;
pub use queue::FlushQueue;
pub use session::{Session, TeardownReport, TickReport};
