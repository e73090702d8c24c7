// Copyright 2026 the Teardown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser tests. Run with `wasm-pack test --headless --firefox teardown_backend_web`.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

use teardown_backend_web::{
    ACTIVE_ATTRIBUTE, BoardView, DomLayerPresenter, GLITCH_CLASS, ScrollProgress, TimerHost,
    WindowTimers,
};
use teardown_core::controller::LayerSink;
use teardown_core::layer::Layer;
use teardown_core::progress::{ProgressSource, ScrubConfig, Unsubscribe};
use teardown_core::time::Duration;

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

fn board_fixture() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let root: HtmlElement = document.create_element("div").unwrap().unchecked_into();
    for layer in Layer::ALL {
        let group = document.create_element("div").unwrap();
        group.set_attribute("data-layer", layer.as_str()).unwrap();
        root.append_child(&group).unwrap();
    }
    let stray = document.create_element("div").unwrap();
    stray.set_attribute("data-layer", "motherboard").unwrap();
    root.append_child(&stray).unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn group_opacity(root: &HtmlElement, layer: Layer) -> String {
    let el: HtmlElement = root
        .query_selector(&format!("[data-layer=\"{}\"]", layer.as_str()))
        .unwrap()
        .unwrap()
        .unchecked_into();
    el.style().get_property_value("opacity").unwrap()
}

#[wasm_bindgen_test]
fn presenter_applies_visibility_rows() {
    let root = board_fixture();
    let mut presenter = DomLayerPresenter::new(root.clone()).unwrap();
    assert_eq!(presenter.group_count(), 7, "unknown layer names are skipped");

    presenter.on_layer(Layer::Die);
    assert_eq!(group_opacity(&root, Layer::Die), "1");
    assert_eq!(group_opacity(&root, Layer::Pcb), "0.3");
    assert_eq!(group_opacity(&root, Layer::Casing), "0");
    assert_eq!(root.get_attribute(ACTIVE_ATTRIBUTE).as_deref(), Some("die"));

    presenter.on_glitch(true);
    assert!(root.class_list().contains(GLITCH_CLASS), "glitch class set");
    presenter.on_glitch(false);
    assert!(!root.class_list().contains(GLITCH_CLASS), "glitch class cleared");
    root.remove();
}

#[wasm_bindgen_test]
fn scroll_source_delivers_current_progress_on_subscribe() {
    let mut source = ScrollProgress::new(ScrubConfig::portfolio()).unwrap();
    let seen = Rc::new(Cell::new(f64::NAN));
    let s = Rc::clone(&seen);
    let mut sub = source.subscribe(Box::new(move |p| s.set(p)));
    let p = seen.get();
    assert!((0.0..=1.0).contains(&p), "progress in range: {p}");
    assert!(source.is_sampling(), "loop runs while subscribed");
    sub.unsubscribe();
    assert_eq!(source.subscriber_count(), 0);
}

#[wasm_bindgen_test(async)]
async fn resubscribing_starts_from_the_current_position() {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    let spacer: HtmlElement = document.create_element("div").unwrap().unchecked_into();
    spacer.style().set_property("height", "5000px").unwrap();
    document.body().unwrap().append_child(&spacer).unwrap();
    window.scroll_to_with_x_and_y(0.0, 0.0);

    let mut source = ScrollProgress::new(ScrubConfig::portfolio()).unwrap();
    let mut first = source.subscribe(Box::new(|_| {}));
    assert_eq!(source.last(), Some(0.0), "top of the page");
    first.unsubscribe();
    sleep_ms(50).await;

    window.scroll_to_with_x_and_y(0.0, 100_000.0);
    let seen = Rc::new(Cell::new(f64::NAN));
    let s = Rc::clone(&seen);
    let mut second = source.subscribe(Box::new(move |p| s.set(p)));
    assert_eq!(seen.get(), source.raw(), "no stale value from the earlier session");
    assert!(seen.get() > 0.9, "scrolled to the bottom: {}", seen.get());

    second.unsubscribe();
    window.scroll_to_with_x_and_y(0.0, 0.0);
    spacer.remove();
}

#[wasm_bindgen_test]
fn board_view_mounts_on_current_scroll_position() {
    let root = board_fixture();
    let mut view = BoardView::new(root.clone()).unwrap();
    assert!(view.layer().is_some(), "primed on mount");
    assert!(!view.glitch(), "no glitch for the initial layer");
    view.dispose();
    view.dispose();
    root.remove();
}

#[wasm_bindgen_test(async)]
async fn window_timers_fire_and_cancel() {
    let timers = WindowTimers::new();
    let fired = Rc::new(Cell::new(0));

    let f = Rc::clone(&fired);
    timers.set_timeout(Duration::from_millis(10), Box::new(move || f.set(f.get() + 1)));
    let f = Rc::clone(&fired);
    let cancelled = timers.set_timeout(
        Duration::from_millis(10),
        Box::new(move || f.set(f.get() + 10)),
    );
    timers.clear_timeout(cancelled);
    assert_eq!(timers.pending(), 1);

    sleep_ms(50).await;
    assert_eq!(fired.get(), 1, "only the uncancelled callback ran");
    assert_eq!(timers.pending(), 0);
}
