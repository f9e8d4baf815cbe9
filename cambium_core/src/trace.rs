// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render-update loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! scheduler instrumentation calls as snapshots are queued and flushed. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use alloc::boxed::Box;
use core::fmt;

use crate::schedule::Channel;

/// Emitted when a snapshot lands in a scheduler slot.
#[derive(Clone, Copy, Debug)]
pub struct SceneQueuedEvent {
    /// Which channel the snapshot was queued on.
    pub channel: Channel,
    /// Whether this call armed the frame callback (i.e. the scheduler was
    /// idle). `false` means a flush was already pending.
    pub armed: bool,
}

/// Emitted at the start of a flush, before any delivery.
#[derive(Clone, Copy, Debug)]
pub struct FlushEvent {
    /// A hidden-channel snapshot is about to be delivered.
    pub hidden: bool,
    /// A primary-channel snapshot is about to be delivered.
    pub primary: bool,
    /// A popup-channel snapshot is about to be delivered.
    pub popup: bool,
}

/// Receives render-update loop events.
///
/// Every method has a default no-op body.
pub trait TraceSink {
    /// A snapshot was queued on a channel.
    fn scene_queued(&mut self, event: SceneQueuedEvent) {
        let _ = event;
    }

    /// A flush is about to deliver the pending snapshots.
    fn flush(&mut self, event: FlushEvent) {
        let _ = event;
    }
}

/// Dispatches events to an optional [`TraceSink`].
///
/// Without the `trace` feature, all methods compile to nothing.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl Tracer {
    /// A tracer that discards everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            #[cfg(feature = "trace")]
            sink: None,
        }
    }

    /// A tracer dispatching to `sink` (when the `trace` feature is enabled).
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(not(feature = "trace"))]
        let _ = sink;
        Self {
            #[cfg(feature = "trace")]
            sink: Some(sink),
        }
    }

    /// Reports a queued snapshot.
    #[inline]
    pub fn scene_queued(&mut self, event: SceneQueuedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.scene_queued(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Reports an imminent flush.
    #[inline]
    pub fn flush(&mut self, event: FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.flush(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "trace")]
        let enabled = self.sink.is_some();
        #[cfg(not(feature = "trace"))]
        let enabled = false;
        f.debug_struct("Tracer").field("enabled", &enabled).finish()
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;

    #[derive(Clone, Default)]
    struct Counts {
        queued: Rc<Cell<u32>>,
        flushes: Rc<Cell<u32>>,
    }

    impl TraceSink for Counts {
        fn scene_queued(&mut self, _event: SceneQueuedEvent) {
            self.queued.set(self.queued.get() + 1);
        }

        fn flush(&mut self, _event: FlushEvent) {
            self.flushes.set(self.flushes.get() + 1);
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let counts = Counts::default();
        let mut tracer = Tracer::new(Box::new(counts.clone()));
        tracer.scene_queued(SceneQueuedEvent {
            channel: Channel::Primary,
            armed: true,
        });
        tracer.scene_queued(SceneQueuedEvent {
            channel: Channel::Popup,
            armed: false,
        });
        tracer.flush(FlushEvent {
            hidden: false,
            primary: true,
            popup: true,
        });
        assert_eq!(counts.queued.get(), 2);
        assert_eq!(counts.flushes.get(), 1);
    }

    #[test]
    fn disabled_tracer_is_inert() {
        let mut tracer = Tracer::disabled();
        tracer.flush(FlushEvent {
            hidden: false,
            primary: false,
            popup: false,
        });
    }
}
