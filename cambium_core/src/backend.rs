// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary contracts for output integrations.
//!
//! Cambium splits output-specific work into integration crates. Each
//! integration provides two pieces:
//!
//! - **Renderer** — Implements [`SceneRenderer`] to turn flushed model
//!   snapshots into a visual representation (an SVG tree, a GPU scene, DOM
//!   nodes). How a snapshot becomes pixels is entirely the integration's
//!   business; the core only guarantees *which* snapshots arrive, and that
//!   each channel sees at most one per frame.
//!
//! - **Frame notifier** — Implements [`FrameNotifier`] over a platform
//!   frame-pacing mechanism (`requestAnimationFrame`, a display link, a
//!   simple timer). This is the only asynchronous primitive the core relies
//!   on.
//!
//! # Crate boundaries
//!
//! `cambium_core` owns the data model, the identity index, and the
//! scheduling contract in this module. Integration crates depend on
//! `cambium_core` and provide platform glue. Application code depends on
//! both and wires them together through a
//! [`RenderScheduler`](crate::schedule::RenderScheduler).

use alloc::boxed::Box;

/// A one-shot callback armed for the end of the next display frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Consumes flushed model snapshots, one entry point per channel.
///
/// Implementations may produce their visual update synchronously or kick off
/// asynchronous work; either way, failures inside the renderer are the
/// integration's concern and cannot corrupt scheduler state (the scheduler
/// clears its pending slots before delivering).
pub trait SceneRenderer<S> {
    /// Renders a snapshot of the primary (main view) model.
    fn update(&mut self, scene: S);

    /// Renders a snapshot of the hidden/offscreen model.
    fn update_hidden(&mut self, scene: S);

    /// Renders a snapshot of the popup overlay model.
    fn update_popup(&mut self, scene: S);
}

/// Schedules one-shot callbacks against the display frame boundary.
///
/// `on_end_of_next_frame` must invoke `callback` exactly once, at or after
/// the end of the current/next rendering frame — never synchronously from
/// inside this call. It must tolerate being re-armed from within a running
/// callback; the [`RenderScheduler`](crate::schedule::RenderScheduler) keeps
/// at most one callback in flight at a time.
pub trait FrameNotifier {
    /// Arms `callback` to fire once after the next frame completes.
    fn on_end_of_next_frame(&mut self, callback: FrameCallback);
}
