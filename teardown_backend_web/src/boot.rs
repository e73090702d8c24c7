// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hero boot terminal.
//!
//! [`BootTerminal`] plays a [`BootSchedule`] into a container element: one
//! `<div class="boot-line boot-{tone}">` per line, a `--boot-percent` custom
//! property and `data-percent` attribute for the progress bar, and a
//! `boot-done` class once the sequence completes. It wakes only when the
//! schedule says the picture changes.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use core::cell::Cell;

use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, HtmlElement};

use teardown_core::boot::{BootSchedule, BootState, BootTone};
use teardown_core::time::HostTime;
use teardown_core::timer::{TimerHost, TimerId};

use crate::timers::WindowTimers;

/// Class added to the container when the sequence completes.
pub const BOOT_DONE_CLASS: &str = "boot-done";

/// Plays a boot schedule into the DOM.
///
/// Dropping the terminal cancels any pending update; lines already shown stay.
pub struct BootTerminal {
    inner: Rc<BootInner>,
}

struct BootInner {
    container: HtmlElement,
    document: Document,
    schedule: BootSchedule,
    timers: WindowTimers,
    started: HostTime,
    shown: Cell<usize>,
    pending: Cell<Option<TimerId>>,
    done: Cell<bool>,
}

fn tone_class(tone: BootTone) -> &'static str {
    match tone {
        BootTone::Accent => "boot-accent",
        BootTone::Normal => "boot-normal",
        BootTone::Warn => "boot-warn",
        BootTone::Info => "boot-info",
    }
}

impl BootTerminal {
    /// Starts playing `schedule` into `container` from now.
    pub fn start(container: HtmlElement, schedule: BootSchedule) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("boot container has no owner document"))?;
        let timers = WindowTimers::new();
        let started = timers.now();
        let inner = Rc::new(BootInner {
            container,
            document,
            schedule,
            timers,
            started,
            shown: Cell::new(0),
            pending: Cell::new(None),
            done: Cell::new(false),
        });
        BootInner::update(&inner)?;
        Ok(Self { inner })
    }

    /// Returns `true` once the sequence has completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.done.get()
    }

    /// Returns the number of lines rendered so far.
    #[must_use]
    pub fn lines_shown(&self) -> usize {
        self.inner.shown.get()
    }
}

impl BootInner {
    fn update(this: &Rc<Self>) -> Result<(), JsValue> {
        this.pending.set(None);
        let elapsed = this.timers.now().saturating_duration_since(this.started);
        this.render(this.schedule.state_at(elapsed))?;

        if let Some(next) = this.schedule.next_change_after(elapsed) {
            let weak: Weak<Self> = Rc::downgrade(this);
            let id = this.timers.set_timeout(
                next.saturating_sub(elapsed),
                Box::new(move || {
                    if let Some(inner) = weak.upgrade()
                        && let Err(err) = Self::update(&inner)
                    {
                        web_sys::console::error_2(&JsValue::from_str("boot terminal:"), &err);
                    }
                }),
            );
            this.pending.set(Some(id));
        }
        Ok(())
    }

    fn render(&self, state: BootState) -> Result<(), JsValue> {
        let lines = self.schedule.lines();
        let visible = state.visible_lines.min(lines.len());
        for line in &lines[self.shown.get().min(visible)..visible] {
            let el: HtmlElement = self.document.create_element("div")?.unchecked_into();
            el.set_class_name(&format!("boot-line {}", tone_class(line.tone)));
            el.set_text_content(Some(line.text));
            self.container.append_child(&el)?;
        }
        self.shown.set(visible.max(self.shown.get()));

        let percent = format!("{}", state.percent);
        self.container.set_attribute("data-percent", &percent)?;
        self.container
            .style()
            .set_property("--boot-percent", &format!("{percent}%"))?;

        if state.done && !self.done.replace(true) {
            self.container.class_list().add_1(BOOT_DONE_CLASS)?;
        }
        Ok(())
    }
}

impl Drop for BootTerminal {
    fn drop(&mut self) {
        if let Some(id) = self.inner.pending.take() {
            self.inner.timers.clear_timeout(id);
        }
    }
}

impl core::fmt::Debug for BootTerminal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootTerminal")
            .field("shown", &self.inner.shown.get())
            .field("done", &self.inner.done.get())
            .finish_non_exhaustive()
    }
}
