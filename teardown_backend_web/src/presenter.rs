// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM presentation of the board.
//!
//! The board markup carries one element per layer group, tagged with a
//! `data-layer` attribute naming the [`Layer`]. [`DomLayerPresenter`] applies
//! the [`LayerVisibility`] row for the active layer to those elements and
//! toggles a `glitch` class on the root while a pulse runs.

use alloc::format;
use alloc::vec::Vec;

use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Element, HtmlElement};

use teardown_core::controller::LayerSink;
use teardown_core::layer::Layer;
use teardown_core::visibility::LayerVisibility;

/// Attribute naming the layer group an element belongs to.
pub const LAYER_ATTRIBUTE: &str = "data-layer";

/// Attribute set on the root to the active layer's name.
pub const ACTIVE_ATTRIBUTE: &str = "data-active-layer";

/// Class present on the root while the glitch pulse runs.
pub const GLITCH_CLASS: &str = "glitch";

/// A [`LayerSink`] that drives the board's DOM.
pub struct DomLayerPresenter {
    root: HtmlElement,
    groups: Vec<(Layer, HtmlElement)>,
}

impl core::fmt::Debug for DomLayerPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomLayerPresenter")
            .field("root", &"HtmlElement")
            .field("groups_len", &self.groups.len())
            .finish()
    }
}

impl DomLayerPresenter {
    /// Collects the `data-layer` groups under `root`.
    ///
    /// Elements whose attribute does not name a layer are skipped; a layer
    /// may have several elements.
    pub fn new(root: HtmlElement) -> Result<Self, JsValue> {
        let nodes = root.query_selector_all(&format!("[{LAYER_ATTRIBUTE}]"))?;
        let mut groups = Vec::new();
        for i in 0..nodes.length() {
            let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            if let Some(layer) = layer_of(&el) {
                groups.push((layer, el));
            }
        }
        Ok(Self { root, groups })
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// Returns the number of group elements found.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

fn layer_of(el: &Element) -> Option<Layer> {
    el.get_attribute(LAYER_ATTRIBUTE)?.parse().ok()
}

/// Formats an opacity for the `opacity` CSS property.
pub(crate) fn opacity_css(opacity: f32) -> alloc::string::String {
    format!("{}", opacity.clamp(0.0, 1.0))
}

impl LayerSink for DomLayerPresenter {
    fn on_layer(&mut self, layer: Layer) {
        let visibility = LayerVisibility::for_layer(layer);
        for (group, el) in &self.groups {
            let opacity = visibility.opacity(*group);
            let s = el.style();
            let _ = s.set_property("opacity", &opacity_css(opacity));
            let _ = s.set_property("pointer-events", if opacity > 0.0 { "auto" } else { "none" });
        }
        let _ = self.root.set_attribute(ACTIVE_ATTRIBUTE, layer.as_str());
    }

    fn on_glitch(&mut self, active: bool) {
        let _ = self
            .root
            .class_list()
            .toggle_with_force(GLITCH_CLASS, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_is_clamped_and_compact() {
        assert_eq!(opacity_css(1.0), "1");
        assert_eq!(opacity_css(0.3), "0.3");
        assert_eq!(opacity_css(1.7), "1", "clamped");
    }
}
