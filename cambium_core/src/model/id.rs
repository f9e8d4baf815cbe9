// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity handles.

use core::fmt;

/// A handle to an element in a [`Model`](super::Model).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an element is destroyed and the slot is reused.
/// Handles are only meaningful for the model that produced them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    /// Slot index into the model's arena.
    pub(crate) idx: u32,
    /// Generation counter — must match the model's generation for this slot.
    pub(crate) generation: u32,
}

impl ElementId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@gen{})", self.idx, self.generation)
    }
}
