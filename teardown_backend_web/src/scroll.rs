// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window scroll position as a [`ProgressSource`].

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use wasm_bindgen::JsValue;
use web_sys::Window;

use teardown_core::progress::{
    ProgressCallback, ProgressSource, Scrub, ScrubConfig, SubscriberList, Subscription,
    scroll_progress,
};
use teardown_core::time::HostTime;

use crate::raf::RafLoop;

/// Page scroll progress, sampled once per animation frame and smoothed with
/// a [`Scrub`].
///
/// Progress is `scrollY / (documentElement.scrollHeight - innerHeight)`.
/// Subscribers receive a value only when the smoothed progress changes. The
/// animation loop runs while anyone is subscribed and stops on the first
/// frame with no subscribers. A subscription made while nobody else is
/// subscribed restarts the smoothing from the current scroll position.
///
/// Cloning yields another handle to the same source.
#[derive(Clone)]
pub struct ScrollProgress {
    inner: Rc<ScrollInner>,
}

struct ScrollInner {
    window: Window,
    config: ScrubConfig,
    scrub: RefCell<Scrub>,
    subscribers: SubscriberList,
    last: Cell<Option<f64>>,
    raf: RefCell<Option<RafLoop>>,
}

impl ScrollProgress {
    /// Creates a source for the global window.
    pub fn new(config: ScrubConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let inner = Rc::new(ScrollInner {
            window,
            config,
            scrub: RefCell::new(Scrub::new(config)),
            subscribers: SubscriberList::new(),
            last: Cell::new(None),
            raf: RefCell::new(None),
        });

        let weak: Weak<ScrollInner> = Rc::downgrade(&inner);
        let raf = RafLoop::new(move |now| {
            if let Some(inner) = weak.upgrade() {
                inner.frame(now);
            }
        });
        *inner.raf.borrow_mut() = Some(raf);
        Ok(Self { inner })
    }

    /// Reads the unsmoothed progress from the DOM.
    #[must_use]
    pub fn raw(&self) -> f64 {
        self.inner.read_raw()
    }

    /// Returns the last value delivered to subscribers, if any.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.inner.last.get()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Returns `true` while the sampling loop is running.
    #[must_use]
    pub fn is_sampling(&self) -> bool {
        self.inner.raf.borrow().as_ref().is_some_and(RafLoop::is_running)
    }
}

/// The scrollable extent of a page.
pub(crate) fn max_scroll(scroll_height: f64, inner_height: f64) -> f64 {
    scroll_height - inner_height
}

impl ScrollInner {
    fn read_raw(&self) -> f64 {
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        let inner_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let scroll_height = self
            .window
            .document()
            .and_then(|d| d.document_element())
            .map_or(0.0, |el| f64::from(el.scroll_height()));
        scroll_progress(scroll_y, max_scroll(scroll_height, inner_height))
    }

    fn frame(&self, now: HostTime) {
        if self.subscribers.is_empty() {
            if let Some(raf) = self.raf.borrow().as_ref() {
                raf.stop();
            }
            return;
        }
        let raw = self.read_raw();
        let value = {
            let mut scrub = self.scrub.borrow_mut();
            scrub.set_target(raw);
            scrub.sample(now)
        };
        if self.last.get() != Some(value) {
            self.last.set(Some(value));
            self.subscribers.dispatch(value);
        }
    }
}

impl ProgressSource for ScrollProgress {
    type Subscription = Subscription;

    fn subscribe(&mut self, mut callback: ProgressCallback) -> Subscription {
        let inner = &*self.inner;
        let value = match inner.last.get() {
            Some(value) if !inner.subscribers.is_empty() => value,
            _ => {
                // Nobody was listening, so the scrub state is stale. Snap to
                // the current position, which also puts a page opened
                // part-way down on the matching layer.
                let raw = inner.read_raw();
                let mut scrub = inner.scrub.borrow_mut();
                *scrub = Scrub::new(inner.config);
                scrub.set_target(raw);
                let value = scrub.sample(crate::now());
                inner.last.set(Some(value));
                value
            }
        };
        callback(value);
        let subscription = inner.subscribers.insert(callback);
        if let Some(raf) = inner.raf.borrow().as_ref() {
            raf.start();
        }
        subscription
    }
}

impl core::fmt::Debug for ScrollProgress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollProgress")
            .field("last", &self.inner.last.get())
            .field("subscribers", &self.inner.subscribers.len())
            .field("sampling", &self.is_sampling())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_pages_report_zero_progress() {
        assert_eq!(
            scroll_progress(0.0, max_scroll(600.0, 800.0)),
            0.0,
            "page fits the viewport"
        );
        assert_eq!(scroll_progress(400.0, max_scroll(1_600.0, 800.0)), 0.5);
    }
}
