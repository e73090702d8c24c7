// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::JsValue;

use teardown_core::layer::Layer;
use teardown_core::trace::{DisposeEvent, GlitchEvent, GlitchPhase, TraceSink, TransitionEvent};

/// A [`TraceSink`] that writes layer changes, glitch pulses and teardown to
/// `console.debug`. Progress samples are not logged.
///
/// Events reach it only when the `trace` feature is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

fn layer_name(layer: Option<Layer>) -> &'static str {
    layer.map_or("-", Layer::as_str)
}

pub(crate) fn transition_line(e: &TransitionEvent) -> String {
    format!(
        "[layer] {:.1}ms {} -> {}",
        e.at.as_millis_f64(),
        layer_name(e.from),
        e.to
    )
}

pub(crate) fn glitch_line(e: &GlitchEvent) -> String {
    let phase = match e.phase {
        GlitchPhase::Start => "start",
        GlitchPhase::End => "end",
        GlitchPhase::Cancelled => "cancel",
    };
    format!(
        "[glitch:{phase}] {:.1}ms gen={}",
        e.at.as_millis_f64(),
        e.generation
    )
}

fn log(line: &str) {
    web_sys::console::debug_1(&JsValue::from_str(line));
}

impl TraceSink for ConsoleSink {
    fn on_transition(&mut self, e: &TransitionEvent) {
        log(&transition_line(e));
    }

    fn on_glitch(&mut self, e: &GlitchEvent) {
        log(&glitch_line(e));
    }

    fn on_dispose(&mut self, e: &DisposeEvent) {
        log(&format!(
            "[dispose] {:.1}ms last={}",
            e.at.as_millis_f64(),
            layer_name(e.last_layer)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teardown_core::time::HostTime;

    #[test]
    fn lines_name_layers_and_phases() {
        let t = TransitionEvent {
            at: HostTime(12_500),
            from: None,
            to: Layer::Casing,
        };
        assert_eq!(transition_line(&t), "[layer] 12.5ms - -> casing");
        let g = GlitchEvent {
            at: HostTime(312_500),
            phase: GlitchPhase::Cancelled,
            generation: 2,
        };
        assert_eq!(glitch_line(&g), "[glitch:cancel] 312.5ms gen=2");
    }
}
