// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll progress sources.
//!
//! A [`ProgressSource`] pushes normalized scroll progress to its subscribers.
//! The source owns sampling cadence and smoothing; subscribers must accept
//! repeated values and arbitrary call rates. Every source delivers one sample
//! synchronously from [`subscribe`](ProgressSource::subscribe) so that a page
//! loaded part-way down starts in the right state.
//!
//! [`scroll_progress`] and [`Scrub`] are the pieces a backend needs to turn a
//! raw scroll offset into a smoothed progress value. [`SubscriberList`] holds
//! a source's callbacks; [`ManualProgress`] is a push-driven source built on
//! it for tests and simulations.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::time::{Duration, HostTime};

/// Callback receiving progress samples.
pub type ProgressCallback = Box<dyn FnMut(f64)>;

/// Cancels a subscription.
pub trait Unsubscribe {
    /// Stops further deliveries. Calling it more than once is a no-op.
    fn unsubscribe(&mut self);
}

/// Pushes scroll progress in `[0, 1]` to subscribers.
pub trait ProgressSource {
    /// Handle returned by [`subscribe`](Self::subscribe).
    type Subscription: Unsubscribe;

    /// Registers `callback` and delivers the current progress to it before
    /// returning.
    fn subscribe(&mut self, callback: ProgressCallback) -> Self::Subscription;
}

/// Computes page progress from a scroll offset and the maximum scroll
/// offset.
///
/// Returns `0.0` for pages that cannot scroll. The result is clamped to
/// `[0, 1]`, which absorbs elastic overscroll on touch devices.
#[must_use]
pub fn scroll_progress(scroll_y: f64, max_scroll: f64) -> f64 {
    if !(max_scroll > 0.0) || scroll_y.is_nan() {
        return 0.0;
    }
    (scroll_y / max_scroll).clamp(0.0, 1.0)
}

/// Configuration for [`Scrub`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrubConfig {
    /// Time for the smoothed value to (nearly) catch up with a jump in the
    /// target. Zero disables smoothing.
    pub lag: Duration,
    /// Distance below which the smoothed value snaps to the target.
    pub snap_epsilon: f64,
}

impl ScrubConfig {
    /// The portfolio page: 1.5 s catch-up.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            lag: Duration::from_millis(1500),
            snap_epsilon: 1e-4,
        }
    }

    /// No smoothing; the output follows the target exactly.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            lag: Duration::ZERO,
            snap_epsilon: 0.0,
        }
    }
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Frame-rate independent exponential smoothing of scroll progress.
///
/// The smoothed value closes `1 - e^(-3·dt/lag)` of the remaining distance
/// per sample, i.e. about 95% of any jump within one `lag`. The first sample
/// snaps straight to the target.
#[derive(Clone, Debug)]
pub struct Scrub {
    config: ScrubConfig,
    target: f64,
    value: Option<f64>,
    last: Option<HostTime>,
}

impl Scrub {
    /// Creates a scrubber with no samples yet.
    #[must_use]
    pub const fn new(config: ScrubConfig) -> Self {
        Self {
            config,
            target: 0.0,
            value: None,
            last: None,
        }
    }

    /// Sets the value the output moves toward.
    pub fn set_target(&mut self, target: f64) {
        if !target.is_nan() {
            self.target = target;
        }
    }

    /// Returns the current target.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns `true` once the output has reached the target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.value == Some(self.target)
    }

    /// Advances the smoothing to `now` and returns the smoothed value.
    pub fn sample(&mut self, now: HostTime) -> f64 {
        let value = match (self.value, self.last) {
            (Some(value), Some(last)) if self.config.lag > Duration::ZERO => {
                let dt = now.saturating_duration_since(last).as_secs_f64();
                let tau = self.config.lag.as_secs_f64() / 3.0;
                let alpha = 1.0 - libm::exp(-dt / tau);
                let next = value + (self.target - value) * alpha;
                if libm::fabs(self.target - next) <= self.config.snap_epsilon {
                    self.target
                } else {
                    next
                }
            }
            _ => self.target,
        };
        self.value = Some(value);
        self.last = Some(now);
        value
    }
}

/// The subscribers of one progress source.
///
/// Sources embed a `SubscriberList` and call [`dispatch`](Self::dispatch) for
/// each new value. A callback may unsubscribe itself or others, or add new
/// subscriptions, while a dispatch is running: removals take effect
/// immediately and additions start with the next dispatch. A dispatch started
/// from inside a callback is queued and delivered to everyone once the
/// current pass finishes.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct SubscriberList {
    inner: Rc<RefCell<ListInner>>,
}

#[derive(Default)]
struct ListInner {
    next_id: u64,
    live: usize,
    subscribers: Vec<(u64, ProgressCallback)>,
    /// Ids unsubscribed while `dispatch` had the list checked out.
    removed: Vec<u64>,
    /// Values dispatched from inside a callback.
    queued: VecDeque<f64>,
    dispatching: bool,
}

impl SubscriberList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().live
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `callback` without delivering anything to it.
    pub fn insert(&self, callback: ProgressCallback) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.live += 1;
        inner.subscribers.push((id, callback));
        Subscription {
            list: Rc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Delivers `progress` to every live subscriber in subscription order.
    pub fn dispatch(&self, progress: f64) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.dispatching {
                inner.queued.push_back(progress);
                return;
            }
            inner.dispatching = true;
        }
        let mut next = Some(progress);
        while let Some(progress) = next {
            self.dispatch_pass(progress);
            let mut inner = self.inner.borrow_mut();
            next = inner.queued.pop_front();
            if next.is_none() {
                inner.dispatching = false;
                inner.removed.clear();
            }
        }
    }

    fn dispatch_pass(&self, progress: f64) {
        let mut subscribers = core::mem::take(&mut self.inner.borrow_mut().subscribers);
        for (id, callback) in &mut subscribers {
            if !self.inner.borrow().removed.contains(id) {
                callback(progress);
            }
        }
        let mut dropped = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let removed = core::mem::take(&mut inner.removed);
            let (keep, gone): (Vec<_>, Vec<_>) = subscribers
                .into_iter()
                .partition(|(id, _)| !removed.contains(id));
            subscribers = keep;
            dropped.extend(gone);
            // Anything subscribed during the pass was pushed onto the empty
            // list.
            subscribers.append(&mut inner.subscribers);
            inner.subscribers = subscribers;
        }
        // Callbacks may own subscriptions whose drop unsubscribes.
        drop(dropped);
    }
}

impl fmt::Debug for SubscriberList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberList")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Subscription handle returned by sources built on [`SubscriberList`].
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a subscription unsubscribes it"]
#[derive(Debug)]
pub struct Subscription {
    list: Weak<RefCell<ListInner>>,
    id: u64,
    active: bool,
}

impl Unsubscribe for Subscription {
    fn unsubscribe(&mut self) {
        if !core::mem::replace(&mut self.active, false) {
            return;
        }
        let Some(list) = self.list.upgrade() else {
            return;
        };
        let id = self.id;
        let callback = {
            let mut inner = list.borrow_mut();
            inner.live -= 1;
            if inner.dispatching {
                inner.removed.push(id);
            }
            let index = inner.subscribers.iter().position(|(sid, _)| *sid == id);
            index.map(|i| inner.subscribers.remove(i))
        };
        // Released outside the borrow; the callback may own subscriptions.
        drop(callback);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A progress source driven by explicit [`set`](Self::set) calls.
///
/// Cloning yields another handle to the same source.
#[derive(Clone)]
pub struct ManualProgress {
    value: Rc<Cell<f64>>,
    subscribers: SubscriberList,
}

impl ManualProgress {
    /// Creates a source currently reporting `initial`.
    #[must_use]
    pub fn new(initial: f64) -> Self {
        Self {
            value: Rc::new(Cell::new(initial)),
            subscribers: SubscriberList::new(),
        }
    }

    /// Returns the last reported value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Records `progress` and delivers it to every subscriber, including
    /// repeats of the previous value.
    pub fn set(&self, progress: f64) {
        self.value.set(progress);
        self.subscribers.dispatch(progress);
    }
}

impl ProgressSource for ManualProgress {
    type Subscription = Subscription;

    fn subscribe(&mut self, mut callback: ProgressCallback) -> Subscription {
        callback(self.value());
        self.subscribers.insert(callback)
    }
}

impl fmt::Debug for ManualProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualProgress")
            .field("value", &self.value.get())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn scroll_progress_handles_degenerate_pages() {
        assert_eq!(scroll_progress(0.0, 0.0), 0.0, "unscrollable page");
        assert_eq!(scroll_progress(50.0, -10.0), 0.0, "negative extent");
        assert_eq!(scroll_progress(f64::NAN, 100.0), 0.0, "nan offset");
        assert_eq!(scroll_progress(50.0, 200.0), 0.25);
        assert_eq!(scroll_progress(-30.0, 200.0), 0.0, "overscroll at top");
        assert_eq!(scroll_progress(230.0, 200.0), 1.0, "overscroll at bottom");
    }

    #[test]
    fn scrub_first_sample_snaps() {
        let mut scrub = Scrub::new(ScrubConfig::portfolio());
        scrub.set_target(0.4);
        assert_eq!(scrub.sample(HostTime(1_000)), 0.4);
        assert!(scrub.is_settled(), "snapped to target");
    }

    #[test]
    fn scrub_converges_within_lag() {
        let mut scrub = Scrub::new(ScrubConfig::portfolio());
        scrub.set_target(0.0);
        scrub.sample(HostTime(0));
        scrub.set_target(1.0);

        let half = scrub.sample(HostTime(16_667));
        assert!(half > 0.0 && half < 0.1, "one frame moves a little: {half}");

        // Same elapsed time in one big step or many small ones lands in the
        // same place.
        let mut stepped = Scrub::new(ScrubConfig::portfolio());
        stepped.set_target(0.0);
        stepped.sample(HostTime(0));
        stepped.set_target(1.0);
        let mut t = 0;
        let mut v = 0.0;
        while t < 1_500_000 {
            t += 10_000;
            v = stepped.sample(HostTime(t));
        }
        let jumped = scrub.sample(HostTime(1_500_000));
        assert!((v - jumped).abs() < 1e-9, "frame-rate independent: {v} vs {jumped}");
        assert!(jumped > 0.94, "about 95% after one lag: {jumped}");
    }

    #[test]
    fn scrub_snaps_when_close() {
        let mut scrub = Scrub::new(ScrubConfig::portfolio());
        scrub.set_target(0.5);
        scrub.sample(HostTime(0));
        scrub.set_target(0.500_05);
        assert_eq!(scrub.sample(HostTime(1)), 0.500_05, "within epsilon");
    }

    #[test]
    fn immediate_scrub_tracks_target() {
        let mut scrub = Scrub::new(ScrubConfig::immediate());
        scrub.sample(HostTime(0));
        scrub.set_target(0.7);
        assert_eq!(scrub.sample(HostTime(1)), 0.7);
        scrub.set_target(f64::NAN);
        assert_eq!(scrub.target(), 0.7, "nan targets are ignored");
    }

    #[test]
    fn manual_source_delivers_on_subscribe_and_set() {
        let mut source = ManualProgress::new(0.3);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let mut sub = source.subscribe(Box::new(move |p| s.borrow_mut().push(p)));
        source.set(0.5);
        source.set(0.5);
        assert_eq!(*seen.borrow(), vec![0.3, 0.5, 0.5], "initial sample then every set");

        sub.unsubscribe();
        sub.unsubscribe();
        source.set(0.9);
        assert_eq!(seen.borrow().len(), 3, "nothing after unsubscribe");
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_during_dispatch_is_honored() {
        let mut source = ManualProgress::new(0.0);
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let sl = Rc::clone(&slot);
        let first = source.subscribe(Box::new(move |p| {
            if p > 0.5 {
                if let Some(sub) = sl.borrow_mut().as_mut() {
                    sub.unsubscribe();
                }
            }
        }));
        let h2 = Rc::clone(&hits);
        let second = source.subscribe(Box::new(move |_| h2.set(h2.get() + 1)));
        *slot.borrow_mut() = Some(second);
        assert_eq!(hits.get(), 1, "initial sample");

        source.set(0.9);
        assert_eq!(hits.get(), 1, "second was unsubscribed before its turn");
        source.set(0.1);
        assert_eq!(hits.get(), 1, "and stays unsubscribed");
        assert_eq!(source.subscriber_count(), 1);
        drop(first);
    }

    #[test]
    fn subscriptions_added_during_dispatch_start_next_time() {
        let list = SubscriberList::new();
        let late_hits = Rc::new(Cell::new(0));
        let late_sub: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let (l, hits, slot) = (list.clone(), Rc::clone(&late_hits), Rc::clone(&late_sub));
        let _adder = list.insert(Box::new(move |_| {
            if slot.borrow().is_none() {
                let h = Rc::clone(&hits);
                *slot.borrow_mut() = Some(l.insert(Box::new(move |_| h.set(h.get() + 1))));
            }
        }));

        list.dispatch(0.1);
        assert_eq!(late_hits.get(), 0, "not called in the pass that added it");
        assert_eq!(list.len(), 2);
        list.dispatch(0.2);
        assert_eq!(late_hits.get(), 1, "called from the next pass");

        if let Some(sub) = late_sub.borrow_mut().as_mut() {
            sub.unsubscribe();
        }
        list.dispatch(0.3);
        assert_eq!(late_hits.get(), 1, "unsubscribed");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn dropped_list_makes_unsubscribe_a_no_op() {
        let list = SubscriberList::new();
        let mut sub = list.insert(Box::new(|_| {}));
        drop(list);
        sub.unsubscribe();
    }

    #[test]
    fn dropping_a_subscription_unsubscribes() {
        let mut source = ManualProgress::new(0.0);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        drop(source.subscribe(Box::new(move |_| h.set(h.get() + 1))));
        assert_eq!(source.subscriber_count(), 0, "released on drop");

        source.set(0.5);
        assert_eq!(hits.get(), 1, "only the initial sample");
        assert_eq!(Rc::strong_count(&hits), 1, "callback freed");
    }

    #[test]
    fn nested_set_is_delivered_after_the_current_pass() {
        let mut source = ManualProgress::new(0.0);
        let src = source.clone();
        let _echo = source.subscribe(Box::new(move |p| {
            if p == 0.5 {
                src.set(0.9);
            }
        }));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _watch = source.subscribe(Box::new(move |p| s.borrow_mut().push(p)));

        source.set(0.5);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5, 0.9], "every value, in order");
        assert_eq!(source.value(), 0.9);
    }
}
