// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for model-tree mutation.

use alloc::string::String;

use thiserror::Error;

/// A failed precondition of a structural model operation.
///
/// All variants are synchronous, local failures surfaced to the immediate
/// caller; none are retried or suppressed internally. A failed operation
/// leaves the tree (and its identity index) exactly as it was before the
/// call.
///
/// Stale [`ElementId`](crate::model::ElementId) handles are *not* an error
/// condition — they panic, like every other use-after-destroy bug.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// An element with this id is already registered in the tree's index.
    ///
    /// Choose a different id, or leave the id empty to have one generated at
    /// attach time.
    #[error("duplicate element id `{id}`")]
    DuplicateId {
        /// The colliding identifier.
        id: String,
    },

    /// The referenced element is not currently a child of the given parent.
    #[error("element is not a child of the given parent")]
    ChildNotFound,

    /// A position argument fell outside the valid range.
    #[error("index {index} out of bounds for {len} children")]
    IndexOutOfBounds {
        /// The offending position.
        index: usize,
        /// The length of the children sequence at call time.
        len: usize,
    },

    /// Root resolution was attempted on an element with no reachable root.
    #[error("element is not attached to a tree root")]
    Detached,
}
