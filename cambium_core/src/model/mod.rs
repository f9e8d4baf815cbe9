// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexed element tree data model.
//!
//! An *element* is a node in a diagram tree. Each element has:
//!
//! - An identity handle ([`ElementId`]) — generational, becoming stale when
//!   the element is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - A string `id`, unique across the whole tree while the element is
//!   attached, and a string type tag used by renderers to select a visual
//!   encoding. The core never interprets the tag.
//! - Topology — one optional parent and an ordered children sequence.
//! - A local transform ([`kurbo::Affine`], identity by default) relating the
//!   element's coordinate frame to its parent's.
//!
//! The distinguished *root* additionally carries the canvas bounds and a
//! producer-advanced revision counter, and owns the tree's [`IdIndex`].
//!
//! # Invariants
//!
//! After every successful mutation:
//!
//! - every attached element's id is unique across the tree;
//! - every non-root element's parent reference agrees with exactly one
//!   parent's children sequence;
//! - the index contents equal the set of elements reachable from the root.
//!
//! Failed mutations leave all three untouched. The index map is only ever
//! mutated through [`Model`]'s structural operations; external code gets
//! read access.

mod id;
mod index;
mod store;
mod traverse;

pub use id::ElementId;
pub use index::{DEFAULT_ID_LENGTH, ID_ALPHABET, IdIndex};
pub use store::Model;
pub use traverse::{Children, Descendants};
