// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the transition controller.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`TransitionController`](crate::controller::TransitionController) calls as
//! it runs. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! A pair `(A, B)` of sinks is itself a sink that forwards every event to
//! both, in order.

use crate::layer::Layer;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to the glitch pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlitchPhase {
    /// The flag was raised and an expiry timer scheduled.
    Start,
    /// The expiry timer fired and the flag was lowered.
    End,
    /// A pending expiry timer was cancelled, either by a newer pulse or by
    /// teardown.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every progress sample the controller receives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSampleEvent {
    /// Host time when the sample was processed.
    pub at: HostTime,
    /// The raw progress value.
    pub progress: f64,
    /// The layer the value resolved to.
    pub resolved: Layer,
}

/// Emitted when the current layer changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// The previous layer, or `None` for the initial state.
    pub from: Option<Layer>,
    /// The new layer.
    pub to: Layer,
}

/// Emitted on every glitch pulse state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlitchEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// What happened.
    pub phase: GlitchPhase,
    /// Pulse generation; each start increments it.
    pub generation: u64,
}

/// Emitted once when a controller is disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisposeEvent {
    /// Host time of teardown.
    pub at: HostTime,
    /// The layer the controller was showing, if it had been primed.
    pub last_layer: Option<Layer>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every progress sample.
    fn on_progress_sample(&mut self, e: &ProgressSampleEvent) {
        _ = e;
    }

    /// Called when the current layer changes (including the initial state).
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when the glitch pulse starts, ends, or is cancelled.
    fn on_glitch(&mut self, e: &GlitchEvent) {
        _ = e;
    }

    /// Called once on teardown.
    fn on_dispose(&mut self, e: &DisposeEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn on_progress_sample(&mut self, e: &ProgressSampleEvent) {
        self.0.on_progress_sample(e);
        self.1.on_progress_sample(e);
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.0.on_transition(e);
        self.1.on_transition(e);
    }

    fn on_glitch(&mut self, e: &GlitchEvent) {
        self.0.on_glitch(e);
        self.1.on_glitch(e);
    }

    fn on_dispose(&mut self, e: &DisposeEvent) {
        self.0.on_dispose(e);
        self.1.on_dispose(e);
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ProgressSampleEvent`].
    #[inline]
    pub fn progress_sample(&mut self, e: &ProgressSampleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_progress_sample(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&mut self, e: &TransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GlitchEvent`].
    #[inline]
    pub fn glitch(&mut self, e: &GlitchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_glitch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DisposeEvent`].
    #[inline]
    pub fn dispose(&mut self, e: &DisposeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispose(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Transitions(Vec<Layer>);

    impl TraceSink for Transitions {
        fn on_transition(&mut self, e: &TransitionEvent) {
            self.0.push(e.to);
        }
    }

    fn sample_transition() -> TransitionEvent {
        TransitionEvent {
            at: HostTime(1_000),
            from: Some(Layer::Casing),
            to: Layer::Thermal,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_transition(&sample_transition());
        sink.on_glitch(&GlitchEvent {
            at: HostTime(0),
            phase: GlitchPhase::Start,
            generation: 1,
        });
    }

    #[test]
    fn pair_forwards_to_both() {
        let mut pair = (Transitions::default(), Transitions::default());
        pair.on_transition(&sample_transition());
        pair.on_dispose(&DisposeEvent {
            at: HostTime(0),
            last_layer: None,
        });
        assert_eq!(pair.0.0, &[Layer::Thermal]);
        assert_eq!(pair.1.0, &[Layer::Thermal]);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.transition(&sample_transition());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = Transitions::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.transition(&sample_transition());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.0, &[Layer::Thermal]);
    }
}
