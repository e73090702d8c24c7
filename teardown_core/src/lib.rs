// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven layer state machine for the portfolio board teardown.
//!
//! `teardown_core` turns a continuous scroll-progress signal into a discrete
//! board [`Layer`](layer::Layer), and pulses a short "glitch" flag every time
//! the layer changes. It is `no_std` compatible (with `alloc`) and knows
//! nothing about the DOM; backend crates supply the progress source, the
//! timer host, and the presenter.
//!
//! # Architecture
//!
//! ```text
//!   ProgressSource (scroll, rAF-sampled)
//!       │  f64 in [0, 1]
//!       ▼
//!   LayerTable::resolve() ──► Layer
//!       │
//!       ▼
//!   TransitionController ──► LayerSink::on_layer()
//!       │                └─► LayerSink::on_glitch(true)
//!       ▼
//!   TimerHost::set_timeout(300 ms) ──► LayerSink::on_glitch(false)
//! ```
//!
//! **[`layer`]**: The closed set of board layers, validated range tables,
//! and the pure progress → layer resolver.
//!
//! **[`controller`]**: [`TransitionController`](controller::TransitionController)
//! and the [`Binding`](controller::Binding) that ties it to a progress source
//! for the lifetime of one mounted view.
//!
//! **[`progress`]**: The [`ProgressSource`](progress::ProgressSource)
//! contract, scroll ratio computation, and [`Scrub`](progress::Scrub)
//! smoothing.
//!
//! **[`timer`]**: The [`TimerHost`](timer::TimerHost) contract and the
//! virtual-clock [`ManualTimers`](timer::ManualTimers).
//!
//! **[`time`]**: Microsecond [`HostTime`](time::HostTime) and
//! [`Duration`](time::Duration).
//!
//! **[`visibility`]**: Per-layer opacity of each board group.
//!
//! **[`boot`]**: The hero bootloader line schedule.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! controller instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod boot;
pub mod controller;
pub mod layer;
pub mod progress;
pub mod time;
pub mod timer;
pub mod trace;
pub mod visibility;
