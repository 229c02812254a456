// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use undercoat_props::{FieldId, PropsId};

/// Errors reported by a [`Session`](crate::Session).
///
/// None of these are fatal. Every one is also logged where it is detected,
/// and the session keeps working; the `Result` lets callers notice usage
/// errors without having to read logs.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The property set was disposed (or never existed in this session).
    #[error("{0} has been disposed")]
    Disposed(PropsId),

    /// A compiled output tried to write a field its owner does not define.
    #[error("field {field} not found in {props}")]
    FieldNotFound {
        /// The owning property set.
        props: PropsId,
        /// The missing field.
        field: FieldId,
    },

    /// The consumer was destroyed by the host.
    #[error("consumer is no longer alive")]
    DeadConsumer,
}
