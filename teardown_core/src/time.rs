// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time in microseconds.
//!
//! [`HostTime`] is a point on the host's monotonic clock expressed in
//! microsecond ticks from an arbitrary epoch (`performance.now()` origin on
//! the web, the start of a virtual clock in tests). [`Duration`] uses the same
//! unit. Browser timestamps are fractional milliseconds, so microseconds keep
//! them exact to well below a frame while staying integral.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time in microsecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw microsecond value.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Converts a millisecond timestamp (e.g. `DOMHighResTimeStamp`) to a
    /// [`HostTime`]. Negative and non-finite inputs map to zero.
    #[inline]
    #[must_use]
    pub fn from_millis_f64(ms: f64) -> Self {
        Self(millis_f64_to_micros(ms))
    }

    /// Returns this time as fractional milliseconds.
    #[inline]
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Adds a duration, saturating at the end of the clock.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}µs)", self.0)
    }
}

/// A span of time in microseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1000)
    }

    /// Creates a duration from whole microseconds.
    #[inline]
    #[must_use]
    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    /// Returns the raw microsecond value.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Returns the duration as fractional milliseconds.
    #[inline]
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Returns the duration as fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}µs)", self.0)
    }
}

fn millis_f64_to_micros(ms: f64) -> u64 {
    if !ms.is_finite() || ms <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "positive finite millisecond timestamps fit in u64 microseconds; casts saturate"
    )]
    let us = libm::round(ms * 1000.0) as u64;
    us
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_conversion_rounds_to_micros() {
        assert_eq!(HostTime::from_millis_f64(16.6667), HostTime(16_667), "rounded");
        assert_eq!(HostTime::from_millis_f64(0.0), HostTime(0), "zero");
        assert_eq!(HostTime::from_millis_f64(-4.0), HostTime(0), "negative clamps");
        assert_eq!(HostTime::from_millis_f64(f64::NAN), HostTime(0), "nan clamps");
    }

    #[test]
    fn duration_arithmetic() {
        let a = Duration::from_millis(300);
        assert_eq!(a.micros(), 300_000);
        assert_eq!((a + Duration(5)).micros(), 300_005);
        assert_eq!(a.saturating_sub(Duration::from_millis(400)), Duration::ZERO);
        assert!((a.as_secs_f64() - 0.3).abs() < 1e-12, "300 ms is 0.3 s");
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1_000);
        assert_eq!(t + Duration(200), HostTime(1_200));
        assert_eq!(HostTime(1_500) - t, Duration(500));
        assert_eq!(t.saturating_duration_since(HostTime(1_500)), Duration::ZERO);
        assert_eq!(HostTime(u64::MAX).saturating_add(Duration(1)), HostTime(u64::MAX));
    }
}
