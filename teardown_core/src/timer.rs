// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot timer contract.
//!
//! [`TimerHost`] is the `setTimeout`/`clearTimeout` pair the controller needs
//! for its glitch pulse, plus a monotonic clock. Backends implement it on top
//! of the platform event loop; [`ManualTimers`] is a virtual clock that fires
//! callbacks only when the caller advances time, which makes glitch timing
//! exact and deterministic in tests.
//!
//! Hosts must never run a callback from inside
//! [`set_timeout`](TimerHost::set_timeout): callbacks always run later, from
//! the host's own event loop.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::time::{Duration, HostTime};

/// Handle for a scheduled callback, returned by
/// [`TimerHost::set_timeout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// A one-shot callback scheduled on a [`TimerHost`].
pub type TimerCallback = Box<dyn FnOnce()>;

/// Schedules and cancels one-shot callbacks on a single-threaded event loop.
pub trait TimerHost {
    /// Returns the host's current monotonic time.
    fn now(&self) -> HostTime;

    /// Schedules `callback` to run once, `delay` from now.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancels a pending callback. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

impl<T: TimerHost + ?Sized> TimerHost for Rc<T> {
    fn now(&self) -> HostTime {
        (**self).now()
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        (**self).set_timeout(delay, callback)
    }

    fn clear_timeout(&self, id: TimerId) {
        (**self).clear_timeout(id);
    }
}

/// A virtual clock that fires timers only when advanced.
///
/// Share it between the code under test and the test body with an `Rc`
/// (`Rc<ManualTimers>` is itself a [`TimerHost`]).
pub struct ManualTimers {
    state: RefCell<ManualState>,
}

struct ManualState {
    now: HostTime,
    next_id: i32,
    pending: Vec<PendingTimer>,
}

struct PendingTimer {
    id: TimerId,
    deadline: HostTime,
    callback: TimerCallback,
}

impl ManualTimers {
    /// Creates a clock reading `start` with nothing scheduled.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            state: RefCell::new(ManualState {
                now: start,
                next_id: 1,
                pending: Vec::new(),
            }),
        }
    }

    /// Returns the number of callbacks still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Returns `true` if `id` is scheduled and has not fired.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state.borrow().pending.iter().any(|t| t.id == id)
    }

    /// Advances the clock by `by`, firing due callbacks. See
    /// [`advance_to`](Self::advance_to).
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Advances the clock to `target`, firing every callback whose deadline
    /// is at or before it.
    ///
    /// Callbacks run in deadline order (ties in scheduling order) with the
    /// clock set to their deadline, so a callback that schedules another timer
    /// sees the right `now`. Timers scheduled by a callback fire in the same
    /// call if they fall due before `target`. Returns the number fired.
    pub fn advance_to(&self, target: HostTime) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                // Ids grow monotonically, so the smallest id among equal
                // deadlines was scheduled first.
                let due = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.id.0))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = state.pending.remove(i);
                    if timer.deadline > state.now {
                        state.now = timer.deadline;
                    }
                    timer.callback
                })
            };
            match next {
                // The borrow is released before running user code.
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
        fired
    }
}

impl TimerHost for ManualTimers {
    fn now(&self) -> HostTime {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let deadline = state.now.saturating_add(delay);
        state.pending.push(PendingTimer {
            id,
            deadline,
            callback,
        });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().pending.retain(|t| t.id != id);
    }
}

impl fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualTimers")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish_non_exhaustive()
    }
}
