// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-loop test doubles for Cambium demos and tests.
//!
//! A [`RenderScheduler`](cambium_core::schedule::RenderScheduler) needs two
//! collaborators: something that paces frames and something that consumes
//! flushed snapshots. This crate supplies controllable stand-ins for both —
//! [`ManualFrames`] ends frames when you say so, [`RecordingRenderer`] keeps
//! every delivery — so scheduler behavior can be asserted deterministically
//! without a display.

#![no_std]

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use cambium_core::backend::{FrameCallback, FrameNotifier, SceneRenderer};
use cambium_core::schedule::Channel;

/// A manually driven frame notifier.
///
/// Armed callbacks queue in call order and fire when the test (or demo
/// loop) declares a frame ended. Clones share the same queue, so one clone
/// can sit inside a scheduler while another drives it.
#[derive(Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<VecDeque<FrameCallback>>>,
    fired: Rc<Cell<u64>>,
}

impl ManualFrames {
    /// Creates a notifier with nothing armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks currently armed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total callbacks fired so far.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired.get()
    }

    /// Ends one frame: fires the oldest armed callback.
    ///
    /// Returns `false` if nothing was armed. A callback may re-arm from
    /// within itself; the new callback waits for the next call.
    pub fn fire_next(&self) -> bool {
        // Pop before invoking so a re-arming callback can enqueue.
        let callback = self.queue.borrow_mut().pop_front();
        match callback {
            Some(callback) => {
                self.fired.set(self.fired.get() + 1);
                callback();
                true
            }
            None => false,
        }
    }

    /// Ends frames until nothing is armed, returning how many fired.
    ///
    /// A callback chain that re-arms on every firing keeps this running;
    /// callers own termination.
    pub fn fire_all(&self) -> u64 {
        let mut count = 0;
        while self.fire_next() {
            count += 1;
        }
        count
    }
}

impl FrameNotifier for ManualFrames {
    fn on_end_of_next_frame(&mut self, callback: FrameCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}

impl fmt::Debug for ManualFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrames")
            .field("pending", &self.pending())
            .field("fired", &self.fired())
            .finish()
    }
}

/// A renderer double recording every delivery with its channel.
///
/// Clones share the same log, so one clone can sit inside a scheduler while
/// another asserts on what arrived.
pub struct RecordingRenderer<S> {
    log: Rc<RefCell<Vec<(Channel, S)>>>,
}

impl<S> Default for RecordingRenderer<S> {
    fn default() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<S> Clone for RecordingRenderer<S> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
        }
    }
}

impl<S> RecordingRenderer<S> {
    /// Creates a renderer with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deliveries observed so far.
    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Number of deliveries observed on `channel`.
    #[must_use]
    pub fn channel_count(&self, channel: Channel) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .count()
    }

    /// Snapshot of all deliveries, in order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<(Channel, S)>
    where
        S: Clone,
    {
        self.log.borrow().clone()
    }

    /// Drains and returns all recorded deliveries.
    pub fn take(&self) -> Vec<(Channel, S)> {
        core::mem::take(&mut *self.log.borrow_mut())
    }
}

impl<S> SceneRenderer<S> for RecordingRenderer<S> {
    fn update(&mut self, scene: S) {
        self.log.borrow_mut().push((Channel::Primary, scene));
    }

    fn update_hidden(&mut self, scene: S) {
        self.log.borrow_mut().push((Channel::Hidden, scene));
    }

    fn update_popup(&mut self, scene: S) {
        self.log.borrow_mut().push((Channel::Popup, scene));
    }
}

impl<S> fmt::Debug for RecordingRenderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRenderer")
            .field("deliveries", &self.delivery_count())
            .finish()
    }
}
