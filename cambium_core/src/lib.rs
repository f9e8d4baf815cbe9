// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexed diagram model tree and frame-coalesced render scheduling.
//!
//! `cambium_core` provides the foundational data structures for maintaining a
//! large, frequently-mutated tree of diagram elements and for batching the
//! resulting redraw work against a fixed display cadence. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! The crate is organized around a model-to-renderer pipeline that turns
//! bursts of tree mutations into at most one rendering pass per frame:
//!
//! ```text
//!   producers ──mutate──► Model ──snapshot──► RenderScheduler::update*()
//!                                                   │
//!               FrameNotifier ──end-of-frame────────┤ (≤ 1 flush per frame)
//!                                                   ▼
//!                              hidden → primary → popup
//!                                                   │
//!                                                   ▼
//!                                             SceneRenderer
//! ```
//!
//! **[`model`]** — Arena-stored element tree with generational handles and a
//! per-tree identity index. Structural operations keep the index exactly in
//! sync with the set of elements reachable from the root.
//!
//! **[`schema`]** — Plain serde records for building a [`Model`](model::Model)
//! from externally supplied data, with auto-generated ids and protection of
//! framework-managed fields.
//!
//! **[`schedule`]** — The [`RenderScheduler`](schedule::RenderScheduler):
//! three last-write-wins snapshot slots (hidden, primary, popup) drained by a
//! single flush per armed frame callback.
//!
//! **[`backend`]** — The [`SceneRenderer`](backend::SceneRenderer) and
//! [`FrameNotifier`](backend::FrameNotifier) traits that output integrations
//! implement.
//!
//! **[`geometry`]** — Coordinate-frame conversion helpers shared by the model
//! tree.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! scheduler instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod error;
pub mod geometry;
pub mod model;
pub mod schedule;
pub mod schema;
pub mod trace;
