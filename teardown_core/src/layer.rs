// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board layers and the progress → layer resolver.
//!
//! The board is peeled apart in a fixed order, from the outer casing down to
//! the "quantum" core. A [`LayerTable`] assigns each [`Layer`] a half-open
//! band `[from, to)` of scroll progress; together the bands cover `[0, 1]`
//! with no gaps or overlaps. [`LayerTable::resolve`] never fails: values the
//! table does not cover (rounding noise past either end, `NaN`) are pinned to
//! a boundary layer.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// One discrete visual state of the board, in reveal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// The closed avatar case.
    Casing,
    /// Thermal camera overlay.
    Thermal,
    /// Bare board substrate.
    Pcb,
    /// Copper traces and vias.
    Traces,
    /// Populated parts.
    Components,
    /// The silicon die.
    Die,
    /// The terminal "quantum core" state.
    Quantum,
}

impl Layer {
    /// Every layer in reveal order.
    pub const ALL: [Self; 7] = [
        Self::Casing,
        Self::Thermal,
        Self::Pcb,
        Self::Traces,
        Self::Components,
        Self::Die,
        Self::Quantum,
    ];

    /// Returns the lowercase name used by the page markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Casing => "casing",
            Self::Thermal => "thermal",
            Self::Pcb => "pcb",
            Self::Traces => "traces",
            Self::Components => "components",
            Self::Die => "die",
            Self::Quantum => "quantum",
        }
    }

    /// Returns the position of this layer in [`Layer::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown layer name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseLayerError;

impl fmt::Display for ParseLayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown board layer name")
    }
}

impl core::error::Error for ParseLayerError {}

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|layer| layer.as_str() == s)
            .ok_or(ParseLayerError)
    }
}

/// A half-open band `[from, to)` of scroll progress assigned to a layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerRange {
    /// The layer shown while progress is inside this band.
    pub layer: Layer,
    /// Inclusive lower bound.
    pub from: f64,
    /// Exclusive upper bound.
    pub to: f64,
}

impl LayerRange {
    /// Creates a range. Use [`LayerTable::new`] to validate a full table.
    #[must_use]
    pub const fn new(layer: Layer, from: f64, to: f64) -> Self {
        Self { layer, from, to }
    }

    /// Returns `true` if `from <= progress < to`.
    #[inline]
    #[must_use]
    pub fn contains(&self, progress: f64) -> bool {
        self.from <= progress && progress < self.to
    }
}

/// Reasons a list of ranges is rejected by [`LayerTable::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableError {
    /// The table has no ranges.
    Empty,
    /// A bound is `NaN` or infinite.
    NonFinite {
        /// Index of the offending range.
        index: usize,
    },
    /// A range has `from >= to`.
    EmptyRange {
        /// Index of the offending range.
        index: usize,
    },
    /// The first range does not start at exactly `0.0`.
    BadStart {
        /// The first range's lower bound.
        from: f64,
    },
    /// A range starts after the previous one ends.
    Gap {
        /// Index of the range that starts late.
        index: usize,
    },
    /// A range starts before the previous one ends.
    Overlap {
        /// Index of the range that starts early.
        index: usize,
    },
    /// The last range ends before `1.0`, leaving the end of the page
    /// uncovered.
    EndsBeforeOne {
        /// The last range's upper bound.
        to: f64,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("layer table is empty"),
            Self::NonFinite { index } => write!(f, "range {index} has a non-finite bound"),
            Self::EmptyRange { index } => write!(f, "range {index} has from >= to"),
            Self::BadStart { from } => write!(f, "table starts at {from}, expected 0"),
            Self::Gap { index } => write!(f, "gap before range {index}"),
            Self::Overlap { index } => write!(f, "range {index} overlaps its predecessor"),
            Self::EndsBeforeOne { to } => write!(f, "table ends at {to}, expected >= 1"),
        }
    }
}

impl core::error::Error for TableError {}

/// An ordered, validated partition of `[0, 1]` into layer bands.
///
/// The table is immutable once built and can be shared read-only between
/// controllers (wrap it in an `Rc`).
#[derive(Clone, Debug, PartialEq)]
pub struct LayerTable {
    ranges: Vec<LayerRange>,
}

impl LayerTable {
    /// Validates and builds a table.
    ///
    /// Adjacent ranges must share their boundary exactly, the first must
    /// start at `0.0`, and the last must reach at least `1.0`.
    pub fn new(ranges: Vec<LayerRange>) -> Result<Self, TableError> {
        let first = ranges.first().ok_or(TableError::Empty)?;
        if first.from != 0.0 && first.from.is_finite() {
            return Err(TableError::BadStart { from: first.from });
        }

        for (index, range) in ranges.iter().enumerate() {
            if !range.from.is_finite() || !range.to.is_finite() {
                return Err(TableError::NonFinite { index });
            }
            if range.from >= range.to {
                return Err(TableError::EmptyRange { index });
            }
            if index > 0 {
                let prev_to = ranges[index - 1].to;
                if range.from > prev_to {
                    return Err(TableError::Gap { index });
                }
                if range.from < prev_to {
                    return Err(TableError::Overlap { index });
                }
            }
        }

        let last = ranges[ranges.len() - 1];
        if last.to < 1.0 {
            return Err(TableError::EndsBeforeOne { to: last.to });
        }

        Ok(Self { ranges })
    }

    /// The table shipped with the portfolio page.
    ///
    /// Most of the teardown happens in the first 15% of the page; the rest of
    /// the scroll length stays on the quantum core. The final bound is a
    /// little past `1.0` so that progress exactly at the bottom of the page
    /// is inside the last band.
    #[must_use]
    pub fn portfolio() -> Self {
        Self {
            ranges: alloc::vec![
                LayerRange::new(Layer::Casing, 0.0, 0.02),
                LayerRange::new(Layer::Thermal, 0.02, 0.03),
                LayerRange::new(Layer::Pcb, 0.03, 0.04),
                LayerRange::new(Layer::Traces, 0.04, 0.07),
                LayerRange::new(Layer::Components, 0.07, 0.12),
                LayerRange::new(Layer::Die, 0.12, 0.15),
                LayerRange::new(Layer::Quantum, 0.15, 1.01),
            ],
        }
    }

    /// Seven equal bands, one per layer.
    #[must_use]
    pub fn even() -> Self {
        let n = Layer::ALL.len() as f64;
        let ranges = Layer::ALL
            .into_iter()
            .enumerate()
            .map(|(i, layer)| {
                let from = i as f64 / n;
                let to = if i + 1 == Layer::ALL.len() {
                    1.0
                } else {
                    (i + 1) as f64 / n
                };
                LayerRange::new(layer, from, to)
            })
            .collect();
        Self { ranges }
    }

    /// Returns the ranges in table order.
    #[must_use]
    pub fn ranges(&self) -> &[LayerRange] {
        &self.ranges
    }

    /// Returns the band assigned to `layer`, if the table has one.
    #[must_use]
    pub fn range_of(&self, layer: Layer) -> Option<&LayerRange> {
        self.ranges.iter().find(|r| r.layer == layer)
    }

    /// Maps a progress value to a layer.
    ///
    /// Returns the first range (in table order) with `from <= progress < to`.
    /// Progress at or past the end of the last band resolves to the last
    /// layer; anything else that no band contains (negative values, `NaN`)
    /// resolves to the first layer.
    #[must_use]
    pub fn resolve(&self, progress: f64) -> Layer {
        if let Some(range) = self.ranges.iter().find(|r| r.contains(progress)) {
            return range.layer;
        }
        // `new` guarantees at least one range.
        let last = &self.ranges[self.ranges.len() - 1];
        if progress >= last.to {
            last.layer
        } else {
            self.ranges[0].layer
        }
    }
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::portfolio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn names_round_trip() {
        for layer in Layer::ALL {
            assert_eq!(layer.as_str().parse::<Layer>(), Ok(layer), "{layer}");
        }
        assert_eq!("lid".parse::<Layer>(), Err(ParseLayerError));
        assert_eq!(Layer::Die.index(), 5);
    }

    #[test]
    fn shipped_tables_validate() {
        let portfolio = LayerTable::portfolio();
        assert_eq!(
            LayerTable::new(portfolio.ranges().to_vec()),
            Ok(portfolio),
            "portfolio table is well-formed"
        );
        let even = LayerTable::even();
        assert_eq!(
            LayerTable::new(even.ranges().to_vec()),
            Ok(even),
            "even table is well-formed"
        );
    }

    #[test]
    fn adjacent_ranges_share_boundaries() {
        for table in [LayerTable::portfolio(), LayerTable::even()] {
            let ranges = table.ranges();
            assert_eq!(ranges[0].from, 0.0);
            assert!(ranges[ranges.len() - 1].to >= 1.0, "covers the end");
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].to, pair[1].from, "{pair:?}");
            }
        }
    }

    #[test]
    fn every_sample_lands_in_exactly_one_range() {
        for table in [LayerTable::portfolio(), LayerTable::even()] {
            for i in 0..=1000 {
                let p = f64::from(i) / 1000.0;
                let layer = table.resolve(p);
                let hits = table.ranges().iter().filter(|r| r.contains(p)).count();
                let range = table.range_of(layer).unwrap();
                if p < 1.0 || range.to > 1.0 {
                    assert_eq!(hits, 1, "p={p}");
                    assert!(range.contains(p), "p={p} resolved to {layer}");
                } else {
                    assert_eq!(layer, Layer::Quantum, "p=1 maps to the final range");
                }
            }
        }
    }

    #[test]
    fn progress_of_one_maps_to_final_range_when_bound_is_exact() {
        let table = LayerTable::new(vec![
            LayerRange::new(Layer::Casing, 0.0, 0.5),
            LayerRange::new(Layer::Quantum, 0.5, 1.0),
        ])
        .unwrap();
        assert_eq!(table.resolve(1.0), Layer::Quantum);
        assert_eq!(table.resolve(0.5), Layer::Quantum, "lower bound is inclusive");
        assert_eq!(table.resolve(0.499_999), Layer::Casing);
    }

    #[test]
    fn out_of_domain_values_pin_to_boundaries() {
        let table = LayerTable::portfolio();
        assert_eq!(table.resolve(-0.001), Layer::Casing);
        assert_eq!(table.resolve(f64::NEG_INFINITY), Layer::Casing);
        assert_eq!(table.resolve(f64::NAN), Layer::Casing);
        assert_eq!(table.resolve(1.5), Layer::Quantum);
        assert_eq!(table.resolve(f64::INFINITY), Layer::Quantum);
    }

    #[test]
    fn portfolio_boundaries() {
        let table = LayerTable::portfolio();
        assert_eq!(table.resolve(0.0), Layer::Casing);
        assert_eq!(table.resolve(0.02), Layer::Thermal);
        assert_eq!(table.resolve(0.03), Layer::Pcb);
        assert_eq!(table.resolve(0.05), Layer::Traces);
        assert_eq!(table.resolve(0.1), Layer::Components);
        assert_eq!(table.resolve(0.14), Layer::Die);
        assert_eq!(table.resolve(0.5), Layer::Quantum);
        assert_eq!(table.resolve(1.0), Layer::Quantum);
    }

    #[test]
    fn validation_rejects_malformed_tables() {
        use Layer::*;
        assert_eq!(LayerTable::new(vec![]), Err(TableError::Empty));
        assert_eq!(
            LayerTable::new(vec![LayerRange::new(Casing, 0.1, 1.0)]),
            Err(TableError::BadStart { from: 0.1 })
        );
        assert_eq!(
            LayerTable::new(vec![LayerRange::new(Casing, 0.0, f64::NAN)]),
            Err(TableError::NonFinite { index: 0 })
        );
        assert_eq!(
            LayerTable::new(vec![
                LayerRange::new(Casing, 0.0, 0.5),
                LayerRange::new(Pcb, 0.5, 0.5),
            ]),
            Err(TableError::EmptyRange { index: 1 })
        );
        assert_eq!(
            LayerTable::new(vec![
                LayerRange::new(Casing, 0.0, 0.4),
                LayerRange::new(Pcb, 0.5, 1.0),
            ]),
            Err(TableError::Gap { index: 1 })
        );
        assert_eq!(
            LayerTable::new(vec![
                LayerRange::new(Casing, 0.0, 0.6),
                LayerRange::new(Pcb, 0.5, 1.0),
            ]),
            Err(TableError::Overlap { index: 1 })
        );
        assert_eq!(
            LayerTable::new(vec![LayerRange::new(Casing, 0.0, 0.9)]),
            Err(TableError::EndsBeforeOne { to: 0.9 })
        );
    }
}
