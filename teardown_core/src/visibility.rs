// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer opacity of each board group.
//!
//! The board artwork has one group per [`Layer`]. Entering a layer does not
//! simply show its own group: neighbouring groups stay partly visible so the
//! teardown reads as peeling rather than swapping (the die view, for example,
//! keeps the substrate, traces and parts faintly underneath).

use crate::layer::Layer;

/// Opacities of all seven board groups for one active layer, indexed by
/// [`Layer::index`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerVisibility {
    opacities: [f32; 7],
}

// Rows: active layer. Columns: casing, thermal, pcb, traces, components, die, quantum.
const ROWS: [[f32; 7]; 7] = [
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.3, 0.4, 0.5, 1.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.2, 1.0],
];

impl LayerVisibility {
    /// Returns the group opacities while `active` is shown.
    #[must_use]
    pub const fn for_layer(active: Layer) -> Self {
        Self {
            opacities: ROWS[active.index()],
        }
    }

    /// Looks up a layer by its markup name, falling back to the casing row
    /// for names the board does not know.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        Self::for_layer(name.parse().unwrap_or(Layer::Casing))
    }

    /// Returns the opacity of `group`.
    #[must_use]
    pub const fn opacity(&self, group: Layer) -> f32 {
        self.opacities[group.index()]
    }

    /// Iterates `(group, opacity)` pairs in reveal order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, f32)> + '_ {
        Layer::ALL.into_iter().map(|group| (group, self.opacity(group)))
    }
}
