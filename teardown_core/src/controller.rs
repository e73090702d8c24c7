// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer transition controller.
//!
//! A [`TransitionController`] tracks which [`Layer`] the board is showing.
//! Each progress sample is resolved through the controller's [`LayerTable`];
//! when the resolved layer differs from the current one the controller
//! notifies its [`LayerSink`] and fires a glitch pulse: the glitch flag goes
//! up immediately and comes down after
//! [`glitch_duration`](ControllerConfig::glitch_duration).
//!
//! # Glitch pulses
//!
//! At most one expiry timer is outstanding per controller. A transition that
//! arrives while a pulse is still running cancels the pending expiry and
//! schedules a fresh one, so a burst of transitions produces one long pulse
//! rather than a queue of short ones. Every pulse carries a generation number;
//! an expiry callback whose generation is no longer the pending one (because
//! it was superseded, or the controller was disposed) does nothing.
//!
//! # Lifecycle
//!
//! A controller starts *unprimed*. The first sample primes it: the resolved
//! layer becomes the current layer and is announced to the sink, without a
//! glitch. [`Binding::mount`] wires a controller to a
//! [`ProgressSource`], which delivers that first sample from the current
//! scroll position. [`dispose`](TransitionController::dispose) (or dropping
//! the [`Binding`]) stops all further notifications.
//!
//! Sinks are notified after the controller has updated its state, so a sink
//! may read [`current_layer`](TransitionController::current_layer) and
//! [`glitch_active`](TransitionController::glitch_active) or dispose the
//! controller. A sink must not feed the controller further samples.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::layer::{Layer, LayerTable};
use crate::progress::{ProgressSource, Unsubscribe};
use crate::time::{Duration, HostTime};
use crate::timer::{TimerHost, TimerId};
use crate::trace::{
    DisposeEvent, GlitchEvent, GlitchPhase, ProgressSampleEvent, TraceSink, Tracer,
    TransitionEvent,
};

/// Receives the controller's output.
pub trait LayerSink {
    /// Called with the new current layer, including the initial one.
    fn on_layer(&mut self, layer: Layer);

    /// Called when the glitch flag is raised (`true`) or lowered (`false`).
    fn on_glitch(&mut self, active: bool);
}

/// A [`LayerSink`] built from two closures.
pub struct FnSink<L, G> {
    on_layer: L,
    on_glitch: G,
}

impl<L: FnMut(Layer), G: FnMut(bool)> FnSink<L, G> {
    /// Wraps a layer callback and a glitch callback.
    #[must_use]
    pub fn new(on_layer: L, on_glitch: G) -> Self {
        Self {
            on_layer,
            on_glitch,
        }
    }
}

impl<L: FnMut(Layer), G: FnMut(bool)> LayerSink for FnSink<L, G> {
    fn on_layer(&mut self, layer: Layer) {
        (self.on_layer)(layer);
    }

    fn on_glitch(&mut self, active: bool) {
        (self.on_glitch)(active);
    }
}

impl<L, G> fmt::Debug for FnSink<L, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

/// Configuration for a [`TransitionController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How long the glitch flag stays up after the latest transition.
    pub glitch_duration: Duration,
}

impl ControllerConfig {
    /// The portfolio page: a 300 ms flash.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self {
            glitch_duration: Duration::from_millis(300),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Turns progress samples into layer changes and glitch pulses.
///
/// See the [module documentation](self) for the state machine.
pub struct TransitionController<S, T> {
    shared: Rc<Shared<S, T>>,
}

struct Shared<S, T> {
    table: Rc<LayerTable>,
    config: ControllerConfig,
    timers: T,
    state: RefCell<TransitionState>,
    /// Borrowed only while notifying, after `state` is released.
    sink: RefCell<S>,
}

struct TransitionState {
    trace: Option<Box<dyn TraceSink>>,
    current: Option<Layer>,
    glitch_active: bool,
    pending_glitch: Option<PendingGlitch>,
    generation: u64,
    disposed: bool,
}

#[derive(Clone, Copy)]
struct PendingGlitch {
    timer: TimerId,
    generation: u64,
}

impl TransitionState {
    fn tracer(&mut self) -> Tracer<'_> {
        match &mut self.trace {
            Some(sink) => Tracer::new(sink.as_mut()),
            None => Tracer::none(),
        }
    }
}

impl<S: LayerSink + 'static, T: TimerHost + 'static> TransitionController<S, T> {
    /// Creates an unprimed controller.
    ///
    /// The table may be passed by value or as an `Rc` shared with other
    /// controllers.
    pub fn new(
        table: impl Into<Rc<LayerTable>>,
        config: ControllerConfig,
        sink: S,
        timers: T,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                table: table.into(),
                config,
                timers,
                state: RefCell::new(TransitionState {
                    trace: None,
                    current: None,
                    glitch_active: false,
                    pending_glitch: None,
                    generation: 0,
                    disposed: false,
                }),
                sink: RefCell::new(sink),
            }),
        }
    }

    /// Attaches a trace sink. Events reach it only when the `trace` feature
    /// is enabled.
    #[must_use]
    pub fn with_trace(self, sink: Box<dyn TraceSink>) -> Self {
        self.shared.state.borrow_mut().trace = Some(sink);
        self
    }

    /// Returns the layer table.
    #[must_use]
    pub fn table(&self) -> &LayerTable {
        &self.shared.table
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> ControllerConfig {
        self.shared.config
    }

    /// Returns the current layer, or `None` before the first sample.
    #[must_use]
    pub fn current_layer(&self) -> Option<Layer> {
        self.shared.state.borrow().current
    }

    /// Returns `true` while a glitch pulse is running.
    #[must_use]
    pub fn glitch_active(&self) -> bool {
        self.shared.state.borrow().glitch_active
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.state.borrow().disposed
    }

    /// Feeds one progress sample.
    ///
    /// Samples that resolve to the current layer are no-ops. Out-of-range
    /// and `NaN` samples are resolved by [`LayerTable::resolve`]'s fallback
    /// rules. Ignored after disposal.
    pub fn on_progress_update(&self, progress: f64) {
        let shared = &*self.shared;
        let (next, glitch) = {
            let mut state = shared.state.borrow_mut();
            if state.disposed {
                return;
            }

            let at = shared.timers.now();
            let next = shared.table.resolve(progress);
            state.tracer().progress_sample(&ProgressSampleEvent {
                at,
                progress,
                resolved: next,
            });

            let prev = state.current;
            if prev == Some(next) {
                return;
            }
            state.current = Some(next);
            state.tracer().transition(&TransitionEvent {
                at,
                from: prev,
                to: next,
            });

            // The priming sample sets the initial state quietly.
            let glitch = prev.is_some();
            if glitch {
                self.start_glitch(&mut state, at);
            }
            (next, glitch)
        };

        shared.sink.borrow_mut().on_layer(next);
        // The sink may have disposed the controller.
        if glitch && !self.is_disposed() {
            shared.sink.borrow_mut().on_glitch(true);
        }
    }

    /// Tears the controller down.
    ///
    /// Cancels any pending glitch expiry and ignores all further samples.
    /// The sink is not notified. Safe to call repeatedly, including from
    /// inside the sink.
    pub fn dispose(&self) {
        let shared = &*self.shared;
        let mut state = shared.state.borrow_mut();
        if state.disposed {
            return;
        }
        state.disposed = true;

        let at = shared.timers.now();
        if let Some(pending) = state.pending_glitch.take() {
            shared.timers.clear_timeout(pending.timer);
            state.tracer().glitch(&GlitchEvent {
                at,
                phase: GlitchPhase::Cancelled,
                generation: pending.generation,
            });
        }
        state.glitch_active = false;
        let last_layer = state.current;
        state.tracer().dispose(&DisposeEvent { at, last_layer });
    }

    fn start_glitch(&self, state: &mut TransitionState, at: HostTime) {
        let shared = &*self.shared;
        if let Some(pending) = state.pending_glitch.take() {
            shared.timers.clear_timeout(pending.timer);
            state.tracer().glitch(&GlitchEvent {
                at,
                phase: GlitchPhase::Cancelled,
                generation: pending.generation,
            });
        }

        state.generation += 1;
        let generation = state.generation;
        state.glitch_active = true;
        state.tracer().glitch(&GlitchEvent {
            at,
            phase: GlitchPhase::Start,
            generation,
        });

        let weak = Rc::downgrade(&self.shared);
        let timer = shared.timers.set_timeout(
            shared.config.glitch_duration,
            Box::new(move || {
                // A dropped controller has no one left to notify.
                if let Some(shared) = weak.upgrade() {
                    shared.end_glitch(generation);
                }
            }),
        );
        state.pending_glitch = Some(PendingGlitch { timer, generation });
    }

    fn handle(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S: LayerSink, T: TimerHost> Shared<S, T> {
    fn end_glitch(&self, generation: u64) {
        {
            let mut state = self.state.borrow_mut();
            match state.pending_glitch {
                Some(pending) if pending.generation == generation && !state.disposed => {}
                _ => return,
            }
            state.pending_glitch = None;
            state.glitch_active = false;
            let at = self.timers.now();
            state.tracer().glitch(&GlitchEvent {
                at,
                phase: GlitchPhase::End,
                generation,
            });
        }
        self.sink.borrow_mut().on_glitch(false);
    }
}

impl<S, T> fmt::Debug for TransitionController<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("TransitionController")
            .field("current", &state.current)
            .field("glitch_active", &state.glitch_active)
            .field("generation", &state.generation)
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}

/// A [`TransitionController`] subscribed to a [`ProgressSource`] for the
/// lifetime of one mounted view.
///
/// Dropping the binding disposes it.
pub struct Binding<S: LayerSink + 'static, T: TimerHost + 'static, U: Unsubscribe> {
    controller: TransitionController<S, T>,
    subscription: Option<U>,
}

impl<S: LayerSink + 'static, T: TimerHost + 'static, U: Unsubscribe> Binding<S, T, U> {
    /// Subscribes `controller` to `source`.
    ///
    /// The source's synchronous first sample primes the controller, so the
    /// sink hears the layer matching the current scroll position before this
    /// returns.
    pub fn mount<P>(source: &mut P, controller: TransitionController<S, T>) -> Self
    where
        P: ProgressSource<Subscription = U>,
    {
        let handle = controller.handle();
        let subscription =
            source.subscribe(Box::new(move |progress| handle.on_progress_update(progress)));
        Self {
            controller,
            subscription: Some(subscription),
        }
    }

    /// Returns the bound controller.
    #[must_use]
    pub fn controller(&self) -> &TransitionController<S, T> {
        &self.controller
    }

    /// Returns `true` until [`dispose`](Self::dispose) runs.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Unsubscribes from the source and disposes the controller. Safe to
    /// call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.controller.dispose();
    }
}

impl<S: LayerSink + 'static, T: TimerHost + 'static, U: Unsubscribe> Drop for Binding<S, T, U> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: LayerSink + 'static, T: TimerHost + 'static, U: Unsubscribe> fmt::Debug
    for Binding<S, T, U>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("controller", &self.controller)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
