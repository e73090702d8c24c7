// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JavaScript-facing views.
//!
//! ```js
//! const board = new BoardView(document.getElementById("board"));
//! const boot = new BootView(document.getElementById("boot"));
//! // on unmount:
//! board.dispose();
//! boot.free();
//! ```

use alloc::boxed::Box;
use alloc::string::String;

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use teardown_core::boot::BootSchedule;
use teardown_core::controller::{Binding, ControllerConfig, TransitionController};
use teardown_core::layer::LayerTable;
use teardown_core::progress::{ScrubConfig, Subscription};

use crate::boot::BootTerminal;
use crate::console::ConsoleSink;
use crate::presenter::DomLayerPresenter;
use crate::scroll::ScrollProgress;
use crate::timers::WindowTimers;

/// The scroll-driven board, mounted on a root element.
#[wasm_bindgen]
pub struct BoardView {
    binding: Binding<DomLayerPresenter, WindowTimers, Subscription>,
    source: ScrollProgress,
}

#[wasm_bindgen]
impl BoardView {
    /// Mounts the board on `root` with the portfolio layer table, glitch
    /// duration and scrub lag. The board shows the layer for the current
    /// scroll position before this returns.
    #[wasm_bindgen(constructor)]
    pub fn new(root: HtmlElement) -> Result<Self, JsValue> {
        Self::mount(root, false)
    }

    /// Like the constructor, also logging transitions to the console when
    /// built with the `trace` feature.
    #[wasm_bindgen(js_name = "withConsoleTrace")]
    pub fn with_console_trace(root: HtmlElement) -> Result<Self, JsValue> {
        Self::mount(root, true)
    }

    /// The current layer's name.
    #[wasm_bindgen(getter)]
    pub fn layer(&self) -> Option<String> {
        self.binding
            .controller()
            .current_layer()
            .map(|l| String::from(l.as_str()))
    }

    /// Whether the glitch pulse is running.
    #[wasm_bindgen(getter)]
    pub fn glitch(&self) -> bool {
        self.binding.controller().glitch_active()
    }

    /// The last smoothed scroll progress.
    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.source.last().unwrap_or(0.0)
    }

    /// Stops listening to scroll and cancels any pending glitch. Safe to call
    /// more than once; `free()` also disposes.
    pub fn dispose(&mut self) {
        self.binding.dispose();
    }
}

impl BoardView {
    fn mount(root: HtmlElement, console_trace: bool) -> Result<Self, JsValue> {
        let presenter = DomLayerPresenter::new(root)?;
        if presenter.group_count() == 0 {
            web_sys::console::warn_1(&JsValue::from_str(
                "teardown: no [data-layer] elements under the board root",
            ));
        }
        let mut source = ScrollProgress::new(ScrubConfig::portfolio())?;
        let mut controller = TransitionController::new(
            LayerTable::portfolio(),
            ControllerConfig::portfolio(),
            presenter,
            WindowTimers::new(),
        );
        if console_trace {
            controller = controller.with_trace(Box::new(ConsoleSink));
        }
        let binding = Binding::mount(&mut source, controller);
        Ok(Self { binding, source })
    }
}

impl core::fmt::Debug for BoardView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoardView")
            .field("binding", &self.binding)
            .field("source", &self.source)
            .finish()
    }
}

/// The hero boot terminal, playing into a container element.
#[wasm_bindgen]
#[derive(Debug)]
pub struct BootView {
    terminal: BootTerminal,
}

#[wasm_bindgen]
impl BootView {
    /// Starts the portfolio boot sequence in `container`.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement) -> Result<Self, JsValue> {
        Ok(Self {
            terminal: BootTerminal::start(container, BootSchedule::portfolio())?,
        })
    }

    /// Whether the sequence has completed.
    #[wasm_bindgen(getter)]
    pub fn done(&self) -> bool {
        self.terminal.is_done()
    }
}
