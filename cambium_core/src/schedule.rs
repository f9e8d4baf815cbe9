// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-coalesced snapshot scheduling.
//!
//! The [`RenderScheduler`] decouples the rate at which model snapshots
//! arrive from the rate at which rendering occurs. Producers may push many
//! snapshots between two display frames; the renderer only ever sees the
//! most recent one per channel, delivered in a single flush per frame.
//!
//! Rendering is assumed expensive relative to model-update frequency, which
//! is why older pending snapshots are discarded rather than queued: a
//! renderer that fell one frame behind would otherwise never catch up.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::backend::{FrameNotifier, SceneRenderer};
use crate::trace::{FlushEvent, SceneQueuedEvent, Tracer};

/// One of the three independent delivery paths the scheduler batches
/// separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The hidden/offscreen model.
    Hidden,
    /// The primary (main view) model.
    Primary,
    /// The popup overlay model.
    Popup,
}

impl Channel {
    /// The fixed order in which channels are delivered within one flush.
    pub const FLUSH_ORDER: [Self; 3] = [Self::Hidden, Self::Primary, Self::Popup];
}

/// Whether a flush callback is currently in flight.
///
/// `Idle` coincides with "all slots empty" between scheduler calls; the
/// transition to `Armed` happens on exactly the slot-filling update that
/// found the scheduler idle, and back on flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArmState {
    Idle,
    Armed,
}

/// The per-channel pending snapshots, each empty or holding the newest one.
struct PendingSlots<S> {
    hidden: Option<S>,
    primary: Option<S>,
    popup: Option<S>,
}

impl<S> PendingSlots<S> {
    const fn empty() -> Self {
        Self {
            hidden: None,
            primary: None,
            popup: None,
        }
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<S> {
        match channel {
            Channel::Hidden => &mut self.hidden,
            Channel::Primary => &mut self.primary,
            Channel::Popup => &mut self.popup,
        }
    }

    fn take_all(&mut self) -> Self {
        Self {
            hidden: self.hidden.take(),
            primary: self.primary.take(),
            popup: self.popup.take(),
        }
    }
}

struct SchedulerInner<S> {
    slots: RefCell<PendingSlots<S>>,
    state: Cell<ArmState>,
    renderer: RefCell<Box<dyn SceneRenderer<S>>>,
    notifier: RefCell<Box<dyn FrameNotifier>>,
    tracer: RefCell<Tracer>,
}

impl<S> SchedulerInner<S> {
    /// Delivers all pending snapshots in [`Channel::FLUSH_ORDER`], once per
    /// armed callback.
    ///
    /// Slots are taken and the state returns to `Idle` *before* delivery:
    /// a re-entrant `update*` from renderer code arms the next frame
    /// normally, and a panicking renderer leaves the scheduler consistent.
    fn flush(inner: &Rc<Self>) {
        let mut taken = inner.slots.borrow_mut().take_all();
        inner.state.set(ArmState::Idle);
        inner.tracer.borrow_mut().flush(FlushEvent {
            hidden: taken.hidden.is_some(),
            primary: taken.primary.is_some(),
            popup: taken.popup.is_some(),
        });
        let mut renderer = inner.renderer.borrow_mut();
        for channel in Channel::FLUSH_ORDER {
            if let Some(scene) = taken.slot_mut(channel).take() {
                match channel {
                    Channel::Hidden => renderer.update_hidden(scene),
                    Channel::Primary => renderer.update(scene),
                    Channel::Popup => renderer.update_popup(scene),
                }
            }
        }
    }
}

/// Coalesces incoming model snapshots into at most one renderer pass per
/// display frame, across three independent channels.
///
/// Each `update*` call overwrites its channel's slot with the newest
/// snapshot and returns immediately; older pending snapshots for that
/// channel are discarded, not queued. The call that finds the scheduler
/// idle arms a single one-shot [`FrameNotifier`] callback; when it fires,
/// all pending channels are delivered to the [`SceneRenderer`] in the fixed
/// order hidden → primary → popup and the slots empty out again.
///
/// Guarantees:
///
/// - at most one flush per armed frame callback, with at most one callback
///   in flight;
/// - the renderer never sees a snapshot older than the latest pushed per
///   channel (last write wins), and never misses the latest one (each arm
///   eventually fires — there is no cancellation);
/// - flush N's snapshots are at least as recent as flush N−1's.
///
/// The scheduler is a cheaply-cloneable handle to shared single-threaded
/// state; an armed callback keeps that state alive until it fires.
///
/// ```rust,ignore
/// let scheduler = RenderScheduler::new(renderer, notifier);
/// scheduler.update(model.snapshot());        // arms the frame callback
/// scheduler.update(model.snapshot());        // overwrites; no second arm
/// // ... frame boundary: renderer receives only the second snapshot.
/// ```
pub struct RenderScheduler<S> {
    inner: Rc<SchedulerInner<S>>,
}

impl<S> Clone for RenderScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for RenderScheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.slots.borrow();
        f.debug_struct("RenderScheduler")
            .field("state", &self.inner.state.get())
            .field("pending_hidden", &slots.hidden.is_some())
            .field("pending_primary", &slots.primary.is_some())
            .field("pending_popup", &slots.popup.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: 'static> RenderScheduler<S> {
    /// Creates an idle scheduler delivering to `renderer`, paced by
    /// `notifier`.
    #[must_use]
    pub fn new(
        renderer: impl SceneRenderer<S> + 'static,
        notifier: impl FrameNotifier + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                slots: RefCell::new(PendingSlots::empty()),
                state: Cell::new(ArmState::Idle),
                renderer: RefCell::new(Box::new(renderer)),
                notifier: RefCell::new(Box::new(notifier)),
                tracer: RefCell::new(Tracer::disabled()),
            }),
        }
    }

    /// Replaces the tracer used for scheduler instrumentation.
    pub fn set_tracer(&self, tracer: Tracer) {
        *self.inner.tracer.borrow_mut() = tracer;
    }

    /// Queues a snapshot for the primary channel.
    pub fn update(&self, scene: S) {
        self.queue(Channel::Primary, scene);
    }

    /// Queues a snapshot for the hidden/offscreen channel.
    pub fn update_hidden(&self, scene: S) {
        self.queue(Channel::Hidden, scene);
    }

    /// Queues a snapshot for the popup overlay channel.
    pub fn update_popup(&self, scene: S) {
        self.queue(Channel::Popup, scene);
    }

    /// Returns whether a flush callback is currently in flight.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.state.get() == ArmState::Armed
    }

    /// Returns whether a snapshot is pending on `channel`.
    #[must_use]
    pub fn pending(&self, channel: Channel) -> bool {
        self.inner.slots.borrow_mut().slot_mut(channel).is_some()
    }

    fn queue(&self, channel: Channel, scene: S) {
        let inner = &self.inner;
        let was_idle = inner.state.get() == ArmState::Idle;
        *inner.slots.borrow_mut().slot_mut(channel) = Some(scene);
        inner.tracer.borrow_mut().scene_queued(SceneQueuedEvent {
            channel,
            armed: was_idle,
        });
        if was_idle {
            inner.state.set(ArmState::Armed);
            let armed = Rc::clone(inner);
            inner
                .notifier
                .borrow_mut()
                .on_end_of_next_frame(Box::new(move || SchedulerInner::flush(&armed)));
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::VecDeque;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use crate::backend::FrameCallback;

    use super::*;

    /// Frame notifier double: callbacks queue up and fire on demand.
    #[derive(Clone, Default)]
    struct TestFrames {
        queue: Rc<RefCell<VecDeque<FrameCallback>>>,
    }

    impl TestFrames {
        fn new() -> Self {
            Self::default()
        }

        fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        /// Fires the oldest queued callback; `false` if none was queued.
        fn fire_next(&self) -> bool {
            // Pop before invoking so a re-arming callback can enqueue.
            let callback = self.queue.borrow_mut().pop_front();
            match callback {
                Some(callback) => {
                    callback();
                    true
                }
                None => false,
            }
        }
    }

    impl FrameNotifier for TestFrames {
        fn on_end_of_next_frame(&mut self, callback: FrameCallback) {
            self.queue.borrow_mut().push_back(callback);
        }
    }

    /// Renderer double logging `(channel, scene)` deliveries.
    #[derive(Clone, Default)]
    struct LogRenderer {
        log: Rc<RefCell<Vec<(Channel, u32)>>>,
    }

    impl LogRenderer {
        fn entries(&self) -> Vec<(Channel, u32)> {
            self.log.borrow().clone()
        }
    }

    impl SceneRenderer<u32> for LogRenderer {
        fn update(&mut self, scene: u32) {
            self.log.borrow_mut().push((Channel::Primary, scene));
        }

        fn update_hidden(&mut self, scene: u32) {
            self.log.borrow_mut().push((Channel::Hidden, scene));
        }

        fn update_popup(&mut self, scene: u32) {
            self.log.borrow_mut().push((Channel::Popup, scene));
        }
    }

    #[test]
    fn coalesces_updates_between_frames() {
        let frames = TestFrames::new();
        let renderer = LogRenderer::default();
        let scheduler = RenderScheduler::new(renderer.clone(), frames.clone());

        scheduler.update(1);
        scheduler.update(2);
        assert_eq!(frames.pending(), 1, "a burst arms exactly one callback");
        assert!(scheduler.is_armed());

        assert!(frames.fire_next());
        assert_eq!(renderer.entries(), vec![(Channel::Primary, 2)]);
        assert!(!scheduler.is_armed());
        assert!(!frames.fire_next(), "no second callback was armed");
    }

    #[test]
    fn three_channels_arm_once_and_flush_in_order() {
        let frames = TestFrames::new();
        let renderer = LogRenderer::default();
        let scheduler = RenderScheduler::new(renderer.clone(), frames.clone());

        scheduler.update(10);
        scheduler.update_hidden(20);
        scheduler.update_popup(30);
        assert_eq!(frames.pending(), 1);

        assert!(frames.fire_next());
        assert_eq!(
            renderer.entries(),
            vec![
                (Channel::Hidden, 20),
                (Channel::Primary, 10),
                (Channel::Popup, 30),
            ]
        );
    }

    #[test]
    fn each_arm_event_yields_one_flush() {
        let frames = TestFrames::new();
        let renderer = LogRenderer::default();
        let scheduler = RenderScheduler::new(renderer.clone(), frames.clone());

        scheduler.update(1);
        assert!(frames.fire_next());
        scheduler.update_hidden(2);
        assert_eq!(frames.pending(), 1, "flush restored the rearm condition");
        assert!(frames.fire_next());

        assert_eq!(
            renderer.entries(),
            vec![(Channel::Primary, 1), (Channel::Hidden, 2)]
        );
        assert!(!frames.fire_next());
    }

    #[test]
    fn last_write_wins_per_channel_independently() {
        let frames = TestFrames::new();
        let renderer = LogRenderer::default();
        let scheduler = RenderScheduler::new(renderer.clone(), frames.clone());

        scheduler.update_popup(1);
        scheduler.update_popup(9);
        scheduler.update(5);
        assert!(scheduler.pending(Channel::Popup));
        assert!(!scheduler.pending(Channel::Hidden));

        assert!(frames.fire_next());
        assert_eq!(
            renderer.entries(),
            vec![(Channel::Primary, 5), (Channel::Popup, 9)]
        );
        assert!(!scheduler.pending(Channel::Popup));
    }

    /// A renderer that pushes a fresh snapshot while one is being delivered.
    #[derive(Clone, Default)]
    struct ReentrantRenderer {
        scheduler: Rc<RefCell<Option<RenderScheduler<u32>>>>,
        log: Rc<RefCell<Vec<u32>>>,
    }

    impl SceneRenderer<u32> for ReentrantRenderer {
        fn update(&mut self, scene: u32) {
            self.log.borrow_mut().push(scene);
            if scene == 1
                && let Some(scheduler) = &*self.scheduler.borrow()
            {
                scheduler.update(2);
            }
        }

        fn update_hidden(&mut self, _scene: u32) {}

        fn update_popup(&mut self, _scene: u32) {}
    }

    #[test]
    fn reentrant_update_during_flush_arms_next_frame() {
        let frames = TestFrames::new();
        let renderer = ReentrantRenderer::default();
        let scheduler = RenderScheduler::new(renderer.clone(), frames.clone());
        *renderer.scheduler.borrow_mut() = Some(scheduler.clone());

        scheduler.update(1);
        assert!(frames.fire_next());
        assert_eq!(
            frames.pending(),
            1,
            "re-entrant update armed the next frame"
        );
        assert!(frames.fire_next());
        assert_eq!(*renderer.log.borrow(), vec![1, 2]);
    }
}
