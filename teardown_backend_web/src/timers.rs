// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout`-backed [`TimerHost`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use teardown_core::time::{Duration, HostTime};
use teardown_core::timer::{TimerCallback, TimerHost, TimerId};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout_js(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout_js(id: i32);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending,
    Running,
    Done,
}

struct Slot {
    id: i32,
    state: Rc<Cell<SlotState>>,
    // Kept alive until the browser has called it or it was cleared.
    _closure: Closure<dyn FnMut()>,
}

/// A [`TimerHost`] on the window's `setTimeout`/`clearTimeout` and
/// `performance.now()`.
///
/// Finished closures are released lazily on the next `set_timeout` or
/// `clear_timeout`. Dropping the host clears everything still pending.
#[derive(Default)]
pub struct WindowTimers {
    slots: RefCell<Vec<Slot>>,
}

impl WindowTimers {
    /// Creates a host with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of callbacks still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|s| s.state.get() == SlotState::Pending)
            .count()
    }

    fn prune(&self) {
        self.slots
            .borrow_mut()
            .retain(|s| s.state.get() != SlotState::Done);
    }
}

/// Converts a delay to the whole milliseconds `setTimeout` takes, rounding up
/// so a callback never runs early.
pub(crate) fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.micros().div_ceil(1000)).unwrap_or(i32::MAX)
}

impl TimerHost for WindowTimers {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        self.prune();

        let state = Rc::new(Cell::new(SlotState::Pending));
        let slot_state = Rc::clone(&state);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if slot_state.get() != SlotState::Pending {
                return;
            }
            slot_state.set(SlotState::Running);
            if let Some(callback) = callback.take() {
                callback();
            }
            slot_state.set(SlotState::Done);
        }) as Box<dyn FnMut()>);

        let id = set_timeout_js(closure.as_ref().unchecked_ref(), timeout_millis(delay));
        self.slots.borrow_mut().push(Slot {
            id,
            state,
            _closure: closure,
        });
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(slot) = self.slots.borrow().iter().find(|s| s.id == id.0)
            && slot.state.get() == SlotState::Pending
        {
            clear_timeout_js(id.0);
            slot.state.set(SlotState::Done);
        }
        self.prune();
    }
}

impl Drop for WindowTimers {
    fn drop(&mut self) {
        for slot in self.slots.get_mut().iter() {
            if slot.state.get() == SlotState::Pending {
                clear_timeout_js(slot.id);
            }
        }
    }
}

impl core::fmt::Debug for WindowTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowTimers")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_rounds_up_to_whole_millis() {
        assert_eq!(timeout_millis(Duration::from_millis(300)), 300);
        assert_eq!(timeout_millis(Duration::from_micros(300_001)), 301);
        assert_eq!(timeout_millis(Duration::ZERO), 0);
        assert_eq!(timeout_millis(Duration(u64::MAX)), i32::MAX, "saturates");
    }
}
