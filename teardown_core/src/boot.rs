// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hero bootloader schedule.
//!
//! The hero section opens with a fake POST log: lines appear on a fixed
//! schedule, a progress bar follows the number of visible lines, and the
//! terminal is replaced by the page once the sequence completes. The schedule
//! is pure data; [`BootSchedule::state_at`] answers "what is on screen after
//! this much time" and [`BootSchedule::next_change_after`] tells a driver when
//! to look again.

use crate::time::Duration;

/// Colour role of a boot line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BootTone {
    /// Banner lines.
    Accent,
    /// Ordinary check results.
    Normal,
    /// Checks that passed with a warning.
    Warn,
    /// Status lines.
    Info,
}

/// One line of the boot log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootLine {
    /// Text shown in the terminal.
    pub text: &'static str,
    /// Time from mount at which the line appears.
    pub delay: Duration,
    /// Colour role.
    pub tone: BootTone,
}

const fn line(text: &'static str, delay_ms: u64, tone: BootTone) -> BootLine {
    BootLine {
        text,
        delay: Duration::from_millis(delay_ms),
        tone,
    }
}

const PORTFOLIO_LINES: [BootLine; 9] = [
    line("SILICON SOUL v2.0 - INITIALIZING...", 0, BootTone::Accent),
    line("POST CHECK: RAM .................. OK", 300, BootTone::Normal),
    line("POST CHECK: GPU .................. OK", 600, BootTone::Normal),
    line("POST CHECK: PORTFOLIO.EXE ........ LOADED", 900, BootTone::Normal),
    line("POST CHECK: ESP32_CORE ........... ONLINE", 1200, BootTone::Normal),
    line("POST CHECK: RF_MODULE ............ CALIBRATED", 1500, BootTone::Normal),
    line("POST CHECK: EGO_MODULE ........... WARN (within limits)", 1800, BootTone::Warn),
    line("MOUNTING INTERFACE ...............", 2100, BootTone::Info),
    line("SIGNAL ACQUIRED. WELCOME, OPERATOR.", 2400, BootTone::Accent),
];

/// What the boot terminal shows at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootState {
    /// Number of lines visible, counted from the first.
    pub visible_lines: usize,
    /// Progress bar value, `0..=100`.
    pub percent: u8,
    /// `true` once the terminal should give way to the page.
    pub done: bool,
}

/// A boot log and its completion time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootSchedule {
    lines: &'static [BootLine],
    done_at: Duration,
}

impl BootSchedule {
    /// Creates a schedule. `lines` must be sorted by delay.
    #[must_use]
    pub const fn new(lines: &'static [BootLine], done_at: Duration) -> Self {
        Self { lines, done_at }
    }

    /// The portfolio hero: nine lines 300 ms apart, done at 2.8 s.
    #[must_use]
    pub const fn portfolio() -> Self {
        Self::new(&PORTFOLIO_LINES, Duration::from_millis(2800))
    }

    /// Returns the lines in display order.
    #[must_use]
    pub const fn lines(&self) -> &'static [BootLine] {
        self.lines
    }

    /// Returns the time at which the sequence completes.
    #[must_use]
    pub const fn done_at(&self) -> Duration {
        self.done_at
    }

    /// Returns the terminal state `elapsed` after mount.
    ///
    /// The percentage is rounded half-up from `visible / total * 100`.
    #[must_use]
    pub fn state_at(&self, elapsed: Duration) -> BootState {
        let visible_lines = self.lines.iter().filter(|l| l.delay <= elapsed).count();
        let total = self.lines.len();
        let percent = if total == 0 {
            100
        } else {
            (2 * visible_lines * 100 + total) / (2 * total)
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "visible_lines <= total, so percent <= 100"
        )]
        let percent = percent as u8;
        BootState {
            visible_lines,
            percent,
            done: elapsed >= self.done_at,
        }
    }

    /// Returns the next time after `elapsed` at which [`state_at`](Self::state_at)
    /// changes, or `None` once the sequence is complete.
    #[must_use]
    pub fn next_change_after(&self, elapsed: Duration) -> Option<Duration> {
        let next_line = self.lines.iter().map(|l| l.delay).find(|d| *d > elapsed);
        let done = (self.done_at > elapsed).then_some(self.done_at);
        match (next_line, done) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Default for BootSchedule {
    fn default() -> Self {
        Self::portfolio()
    }
}
