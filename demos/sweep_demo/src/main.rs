// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted scroll session that exercises the controller and the
//! diagnostics pipeline.
//!
//! Plays a scroll script at 60 frames per second on a virtual clock: the raw
//! page progress follows the script, a [`Scrub`] smooths it the way the page
//! does, and the smoothed value drives a [`TransitionController`] through a
//! [`ManualProgress`] source. Events go to a
//! [`PrettyPrintSink`](teardown_debug::pretty::PrettyPrintSink) on stdout and
//! a [`RecorderSink`](teardown_debug::recorder::RecorderSink), which is then
//! exported as a Chrome trace.
//!
//! Pass `even` to use equal-width layer bands instead of the portfolio table.

use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::rc::Rc;

use teardown_core::controller::{Binding, ControllerConfig, FnSink, TransitionController};
use teardown_core::layer::LayerTable;
use teardown_core::progress::{ManualProgress, Scrub, ScrubConfig};
use teardown_core::time::{Duration, HostTime};
use teardown_core::timer::ManualTimers;

use teardown_debug::pretty::PrettyPrintSink;
use teardown_debug::recorder::RecorderSink;

/// 60 Hz frame interval.
const FRAME: Duration = Duration::from_micros(16_667);

/// Raw scroll progress keyframes: (time in ms, progress). Linear in between.
const SCRIPT: [(u64, f64); 7] = [
    (0, 0.0),
    (500, 0.0),
    (2_500, 0.2),
    (4_000, 1.0),
    (5_000, 1.0),
    (5_200, 0.03),
    (7_000, 0.03),
];

fn script_at(ms: f64) -> f64 {
    let mut prev = SCRIPT[0];
    for key in SCRIPT {
        let (t, p) = (key.0 as f64, key.1);
        if ms <= t {
            let t0 = prev.0 as f64;
            if t <= t0 {
                return p;
            }
            return prev.1 + (p - prev.1) * (ms - t0) / (t - t0);
        }
        prev = key;
    }
    prev.1
}

fn main() -> std::io::Result<()> {
    let table = if std::env::args().any(|a| a == "even") {
        LayerTable::even()
    } else {
        LayerTable::portfolio()
    };

    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).without_samples();
    let recorder = RecorderSink::new();

    // -- controller --------------------------------------------------------
    let clock = Rc::new(ManualTimers::new(HostTime(0)));
    let transitions = Rc::new(Cell::new(0_u32));
    let pulses = Rc::new(Cell::new(0_u32));
    let (t, p) = (Rc::clone(&transitions), Rc::clone(&pulses));
    let sink = FnSink::new(
        move |_| t.set(t.get() + 1),
        move |active| {
            if !active {
                p.set(p.get() + 1);
            }
        },
    );
    let controller = TransitionController::new(
        table,
        ControllerConfig::portfolio(),
        sink,
        Rc::clone(&clock),
    )
    .with_trace(Box::new((pretty, recorder.clone())));

    let mut source = ManualProgress::new(0.0);
    let mut binding = Binding::mount(&mut source, controller);

    // -- simulated frames --------------------------------------------------
    let mut scrub = Scrub::new(ScrubConfig::portfolio());
    let end = HostTime::from_millis_f64(SCRIPT[SCRIPT.len() - 1].0 as f64);
    let mut now = HostTime(0);
    let mut frames = 0_u32;
    while now <= end {
        clock.advance_to(now);
        scrub.set_target(script_at(now.as_millis_f64()));
        let value = scrub.sample(now);
        if value != source.value() {
            source.set(value);
        }
        now = now + FRAME;
        frames += 1;
    }

    // Let the last pulse finish, then tear down.
    clock.advance(Duration::from_millis(1_000));
    binding.dispose();

    // -- export Chrome trace -----------------------------------------------
    let path = "sweep_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    teardown_debug::chrome::export(&recorder.to_bytes(), &mut writer)?;
    writer.flush()?;

    println!(
        "Wrote {path} ({frames} frames, {} layer changes, {} glitch pulses)",
        transitions.get(),
        pulses.get(),
    );
    Ok(())
}
