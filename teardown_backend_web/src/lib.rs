// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for teardown.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` frame loop
//! - [`WindowTimers`]: `setTimeout`/`clearTimeout` [`TimerHost`]
//! - [`ScrollProgress`]: window scroll as a smoothed progress source
//! - [`DomLayerPresenter`]: `data-layer` group opacities and the glitch class
//! - [`BootTerminal`]: the hero boot log
//! - [`BoardView`] and [`BootView`]: `wasm-bindgen` exports for the page
//!
//! Build with: `wasm-pack build --target web teardown_backend_web`
//!
//! # Crate features
//!
//! - `trace` (disabled by default): lets [`BoardView::with_console_trace`]
//!   log controller events via [`ConsoleSink`].

#![no_std]
// This crate only runs in the browser; suppress dead-code warnings when
// cargo-checking on a native host target.
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod board;
mod boot;
mod console;
mod presenter;
mod raf;
mod scroll;
mod timers;

pub use board::{BoardView, BootView};
pub use boot::{BOOT_DONE_CLASS, BootTerminal};
pub use console::ConsoleSink;
pub use presenter::{ACTIVE_ATTRIBUTE, DomLayerPresenter, GLITCH_CLASS, LAYER_ATTRIBUTE};
pub use raf::RafLoop;
pub use scroll::ScrollProgress;
pub use teardown_core::timer::TimerHost;
pub use timers::WindowTimers;

use teardown_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}
