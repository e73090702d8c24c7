// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Progress samples become a counter track, layer changes and teardown become
//! instant events, and each glitch pulse becomes a `B`/`E` span that closes
//! when the pulse ends or is cancelled.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use teardown_core::trace::GlitchPhase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = recorded.at().micros();
        match recorded {
            RecordedEvent::ProgressSample(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "progress",
                    "cat": "Scroll",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "progress": if e.progress.is_finite() { e.progress } else { 0.0 },
                    }
                }));
            }
            RecordedEvent::Transition(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.to.as_str(),
                    "cat": "Layer",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "from": e.from.map(|l| l.as_str()),
                        "to": e.to.as_str(),
                    }
                }));
            }
            RecordedEvent::Glitch(e) => {
                let ph = match e.phase {
                    GlitchPhase::Start => "B",
                    GlitchPhase::End | GlitchPhase::Cancelled => "E",
                };
                events.push(json!({
                    "ph": ph,
                    "name": "glitch",
                    "cat": "Glitch",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "args": {
                        "generation": e.generation,
                        "phase": format!("{:?}", e.phase),
                    }
                }));
            }
            RecordedEvent::Dispose(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "dispose",
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "last_layer": e.last_layer.map(|l| l.as_str()),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use teardown_core::layer::Layer;
    use teardown_core::time::HostTime;
    use teardown_core::trace::{GlitchEvent, TraceSink, TransitionEvent};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_transition(&TransitionEvent {
            at: HostTime(1_000),
            from: Some(Layer::Pcb),
            to: Layer::Traces,
        });
        rec.on_glitch(&GlitchEvent {
            at: HostTime(1_000),
            phase: GlitchPhase::Start,
            generation: 3,
        });
        rec.on_glitch(&GlitchEvent {
            at: HostTime(301_000),
            phase: GlitchPhase::End,
            generation: 3,
        });

        let mut out = Vec::new();
        export(&rec.to_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "traces");
        assert_eq!(parsed[0]["args"]["from"], "pcb");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 301_000);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty(), "no events");
    }
}
