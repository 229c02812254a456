// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undercoat Props: prioritized, change-tracking property sets.
//!
//! This crate provides the leaf data model for layered parameter overrides.
//! Combining sets into a shared, cached output is handled by
//! `undercoat_cascade`.
//!
//! ## Core Concepts
//!
//! - [`FieldId`] names a parameter slot; [`FieldNames`] maps ids back to
//!   readable names for diagnostics.
//! - [`Value`] is a closed sum over color, float, int, texture and vector.
//! - [`PropertySet`] is one contributor's bag of values, ordered against
//!   other sets by its [`PropsKey`] `(priority, id)`.
//! - [`Tolerance`] decides when a new value is different enough to count as a
//!   change.
//! - [`PropertyBlock`] is the flat merged output handed to consumers.
//!
//! ## Quick Start
//!
//! ```rust
//! use undercoat_props::{
//!     Change, Color, FieldNames, Notification, PropertyBlock, PropertySet, PropsId, Tolerance,
//!     Value,
//! };
//!
//! let mut names = FieldNames::with_common();
//! let color = names.intern("_Color");
//! let tol = Tolerance::DEFAULT;
//!
//! let mut set = PropertySet::new(PropsId::from_serial(0), 0);
//! set.set(color, Value::Color(Color::rgb(1.0, 0.0, 0.0)), &tol);
//!
//! // Changes made right after construction are coalesced.
//! assert_eq!(set.finish_batch(), Some(Notification::EntriesChanged));
//!
//! // After the batch, changes are reported one at a time.
//! let change = set.set(color, Value::Color(Color::rgb(0.0, 0.0, 1.0)), &tol);
//! assert_eq!(change, Change::Value(color));
//!
//! let mut block = PropertyBlock::new();
//! set.write(color, &mut block).unwrap();
//! assert_eq!(block.color(color), Some(Color::rgb(0.0, 0.0, 1.0)));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod block;
mod error;
mod id;
mod names;
mod set;
mod tolerance;
mod value;

pub use block::PropertyBlock;
pub use error::PropsError;
pub use id::{FieldId, PropsId, PropsKey};
pub use names::{COMMON_FIELD_NAMES, FieldLabel, FieldNames};
pub use set::{Change, Notification, PropertySet};
pub use tolerance::Tolerance;
pub use value::{Color, TextureHandle, Value, ValueKind, Vec4};
