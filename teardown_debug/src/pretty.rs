// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use teardown_core::layer::Layer;
use teardown_core::time::HostTime;
use teardown_core::trace::{
    DisposeEvent, GlitchEvent, GlitchPhase, ProgressSampleEvent, TraceSink, TransitionEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    samples: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            samples: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            samples: true,
        }
    }

    /// Suppresses `[sample]` lines, which fire on every scroll frame.
    #[must_use]
    pub fn without_samples(mut self) -> Self {
        self.samples = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.as_millis_f64()
}

fn layer_name(layer: Option<Layer>) -> &'static str {
    layer.map_or("-", Layer::as_str)
}

fn phase_name(phase: GlitchPhase) -> &'static str {
    match phase {
        GlitchPhase::Start => "start",
        GlitchPhase::End => "end",
        GlitchPhase::Cancelled => "cancel",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_progress_sample(&mut self, e: &ProgressSampleEvent) {
        if !self.samples {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[sample] at={:.1}ms progress={:.4} -> {}",
            ms(e.at),
            e.progress,
            e.resolved,
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[layer] at={:.1}ms {} -> {}",
            ms(e.at),
            layer_name(e.from),
            e.to,
        );
    }

    fn on_glitch(&mut self, e: &GlitchEvent) {
        let _ = writeln!(
            self.writer,
            "[glitch:{}] at={:.1}ms gen={}",
            phase_name(e.phase),
            ms(e.at),
            e.generation,
        );
    }

    fn on_dispose(&mut self, e: &DisposeEvent) {
        let _ = writeln!(
            self.writer,
            "[dispose] at={:.1}ms last={}",
            ms(e.at),
            layer_name(e.last_layer),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_transition() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transition(&TransitionEvent {
            at: HostTime(1_500),
            from: None,
            to: Layer::Casing,
        });
        sink.on_transition(&TransitionEvent {
            at: HostTime(2_000_000),
            from: Some(Layer::Casing),
            to: Layer::Traces,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[layer] at=1.5ms - -> casing"), "got: {output}");
        assert!(output.contains("at=2000.0ms casing -> traces"), "got: {output}");
    }

    #[test]
    fn samples_can_be_suppressed() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_samples();
        sink.on_progress_sample(&ProgressSampleEvent {
            at: HostTime(0),
            progress: 0.5,
            resolved: Layer::Quantum,
        });
        sink.on_glitch(&GlitchEvent {
            at: HostTime(300_000),
            phase: GlitchPhase::End,
            generation: 4,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[sample]"), "got: {output}");
        assert!(output.contains("[glitch:end] at=300.0ms gen=4"), "got: {output}");
    }
}
