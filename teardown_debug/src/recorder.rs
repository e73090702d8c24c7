// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a byte
//! buffer as fixed-size little-endian records. [`decode`] reads them back as
//! an iterator of [`RecordedEvent`].
//!
//! A controller takes ownership of its trace sink, so clones of a
//! `RecorderSink` share one buffer: keep a clone to read the recording back.

use std::cell::RefCell;
use std::rc::Rc;

use teardown_core::layer::Layer;
use teardown_core::time::HostTime;
use teardown_core::trace::{
    DisposeEvent, GlitchEvent, GlitchPhase, ProgressSampleEvent, TraceSink, TransitionEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PROGRESS_SAMPLE: u8 = 1;
const TAG_TRANSITION: u8 = 2;
const TAG_GLITCH: u8 = 3;
const TAG_DISPOSE: u8 = 4;

const NO_LAYER: u8 = u8::MAX;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a shared binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Returns the number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    /// Decodes the recording so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        decode(&self.buf.borrow()).collect()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u64(&self, v: u64) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&self, t: HostTime) {
        self.write_u64(t.micros());
    }

    fn write_layer(&self, layer: Layer) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "there are seven layers"
        )]
        self.write_u8(layer.index() as u8);
    }

    fn write_option_layer(&self, layer: Option<Layer>) {
        match layer {
            Some(l) => self.write_layer(l),
            None => self.write_u8(NO_LAYER),
        }
    }

    fn write_phase(&self, p: GlitchPhase) {
        self.write_u8(match p {
            GlitchPhase::Start => 0,
            GlitchPhase::End => 1,
            GlitchPhase::Cancelled => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_progress_sample(&mut self, e: &ProgressSampleEvent) {
        self.write_u8(TAG_PROGRESS_SAMPLE);
        self.write_time(e.at);
        self.write_u64(e.progress.to_bits());
        self.write_layer(e.resolved);
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.write_u8(TAG_TRANSITION);
        self.write_time(e.at);
        self.write_option_layer(e.from);
        self.write_layer(e.to);
    }

    fn on_glitch(&mut self, e: &GlitchEvent) {
        self.write_u8(TAG_GLITCH);
        self.write_time(e.at);
        self.write_phase(e.phase);
        self.write_u64(e.generation);
    }

    fn on_dispose(&mut self, e: &DisposeEvent) {
        self.write_u8(TAG_DISPOSE);
        self.write_time(e.at);
        self.write_option_layer(e.last_layer);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`ProgressSampleEvent`].
    ProgressSample(ProgressSampleEvent),
    /// A [`TransitionEvent`].
    Transition(TransitionEvent),
    /// A [`GlitchEvent`].
    Glitch(GlitchEvent),
    /// A [`DisposeEvent`].
    Dispose(DisposeEvent),
}

impl RecordedEvent {
    /// Returns the host time of the event.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::ProgressSample(e) => e.at,
            Self::Transition(e) => e.at,
            Self::Glitch(e) => e.at,
            Self::Dispose(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unrecognised record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        let bytes = self.data.get(self.pos..self.pos + 8)?;
        let v = u64::from_le_bytes(bytes.try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_layer(&mut self) -> Option<Layer> {
        Layer::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_option_layer(&mut self) -> Option<Option<Layer>> {
        match self.read_u8()? {
            NO_LAYER => Some(None),
            v => Layer::ALL.get(usize::from(v)).copied().map(Some),
        }
    }

    fn read_phase(&mut self) -> Option<GlitchPhase> {
        Some(match self.read_u8()? {
            0 => GlitchPhase::Start,
            1 => GlitchPhase::End,
            _ => GlitchPhase::Cancelled,
        })
    }

    fn decode_progress_sample(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ProgressSample(ProgressSampleEvent {
            at: self.read_time()?,
            progress: f64::from_bits(self.read_u64()?),
            resolved: self.read_layer()?,
        }))
    }

    fn decode_transition(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Transition(TransitionEvent {
            at: self.read_time()?,
            from: self.read_option_layer()?,
            to: self.read_layer()?,
        }))
    }

    fn decode_glitch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Glitch(GlitchEvent {
            at: self.read_time()?,
            phase: self.read_phase()?,
            generation: self.read_u64()?,
        }))
    }

    fn decode_dispose(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Dispose(DisposeEvent {
            at: self.read_time()?,
            last_layer: self.read_option_layer()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_PROGRESS_SAMPLE => self.decode_progress_sample(),
            TAG_TRANSITION => self.decode_transition(),
            TAG_GLITCH => self.decode_glitch(),
            TAG_DISPOSE => self.decode_dispose(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(rec: &mut RecorderSink) {
        rec.on_progress_sample(&ProgressSampleEvent {
            at: HostTime(0),
            progress: 0.0,
            resolved: Layer::Casing,
        });
        rec.on_transition(&TransitionEvent {
            at: HostTime(0),
            from: None,
            to: Layer::Casing,
        });
        rec.on_transition(&TransitionEvent {
            at: HostTime(16_000),
            from: Some(Layer::Casing),
            to: Layer::Thermal,
        });
        rec.on_glitch(&GlitchEvent {
            at: HostTime(16_000),
            phase: GlitchPhase::Start,
            generation: 1,
        });
        rec.on_dispose(&DisposeEvent {
            at: HostTime(50_000),
            last_layer: Some(Layer::Thermal),
        });
    }

    #[test]
    fn recorded_session_decodes_in_order() {
        let mut rec = RecorderSink::new();
        sample_session(&mut rec);
        let events = rec.events();
        assert_eq!(events.len(), 5);
        assert!(
            matches!(events[1], RecordedEvent::Transition(TransitionEvent { from: None, .. })),
            "initial transition has no source layer"
        );
        assert_eq!(
            events[3],
            RecordedEvent::Glitch(GlitchEvent {
                at: HostTime(16_000),
                phase: GlitchPhase::Start,
                generation: 1,
            })
        );
        assert_eq!(events[4].at(), HostTime(50_000));
    }

    #[test]
    fn clones_share_one_buffer() {
        let rec = RecorderSink::new();
        let mut handle = rec.clone();
        sample_session(&mut handle);
        drop(handle);
        assert_eq!(rec.events().len(), 5, "recording visible through the kept clone");
    }

    #[test]
    fn nan_progress_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_progress_sample(&ProgressSampleEvent {
            at: HostTime(1),
            progress: f64::NAN,
            resolved: Layer::Casing,
        });
        match rec.events()[0] {
            RecordedEvent::ProgressSample(e) => assert!(e.progress.is_nan(), "NaN preserved"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        sample_session(&mut rec);
        let bytes = rec.to_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 4, "partial trailing record dropped");
        assert_eq!(decode(&[0xEE, 1, 2]).count(), 0, "unknown tag");
        assert!(RecorderSink::new().is_empty(), "fresh recorder");
    }
}
