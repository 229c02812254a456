// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use crate::id::FieldId;

/// Errors raised by [`PropertySet`](crate::PropertySet).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropsError {
    /// A write was requested for a field the set does not define.
    ///
    /// Seen from a compiled output this means the rule "ownership implies
    /// presence" was broken.
    #[error("field {field} not found")]
    FieldNotFound {
        /// The missing field.
        field: FieldId,
    },
}
