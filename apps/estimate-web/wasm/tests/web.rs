//! Browser tests for the DOM adapter and `localStorage` store
//!
//! Run with `wasm-pack test --headless --chrome apps/estimate-web/wasm`.

#![cfg(target_arch = "wasm32")]

use estimate_core::{Column, EstimateCounter, FormConfig, FormState, KvStore, SnapshotStore};
use estimate_wasm::dom;
use estimate_wasm::LocalStorage;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_rows_container() -> web_sys::Document {
    let document = dom::document().unwrap();
    if let Some(old) = document.get_element_by_id(dom::ROWS_CONTAINER) {
        old.remove();
    }
    let container = document.create_element("div").unwrap();
    container.set_id(dom::ROWS_CONTAINER);
    document.body().unwrap().append_child(&container).unwrap();
    document
}

#[wasm_bindgen_test]
fn render_rows_creates_cells_once() {
    let document = fresh_rows_container();
    assert_eq!(dom::render_rows(&document, 14).unwrap(), 14);
    // A second render must not duplicate rows
    assert_eq!(dom::render_rows(&document, 14).unwrap(), 0);

    let cells = dom::read_cells(&document).unwrap();
    assert_eq!(cells.len(), 14 * Column::COUNT);
    let prices = document.query_selector_all("#rows input.price").unwrap();
    assert_eq!(prices.length(), 14);
}

#[wasm_bindgen_test]
fn write_form_fills_cells() {
    let document = fresh_rows_container();
    let config = FormConfig {
        row_count: 3,
        ..FormConfig::default()
    };
    dom::render_rows(&document, config.row_count).unwrap();

    let mut state = FormState::new(&config);
    state.set_cell(2, Column::Price, "42.00");
    dom::write_form(&document, &state).unwrap();

    let cells = dom::read_cells(&document).unwrap();
    assert!(cells.contains(&(2, Column::Price, "42.00".to_string())));
}

#[wasm_bindgen_test]
fn local_storage_backs_counter_and_snapshot() {
    let store = LocalStorage::open().unwrap();
    store.remove("test.estNumber").unwrap();
    store.remove("test.snapshot").unwrap();

    let counter = EstimateCounter::new(store.clone(), "test.estNumber");
    assert_eq!(counter.next_number().unwrap().0, 1);
    assert_eq!(counter.next_number().unwrap().0, 2);
    assert_eq!(store.get("test.estNumber").unwrap().as_deref(), Some("2"));

    let config = FormConfig::default();
    let snapshots = SnapshotStore::new(store.clone(), "test.snapshot");
    let mut form = FormState::new(&config);
    form.set_field("f_name", "Browser");
    snapshots.save(&form, &config).unwrap();

    let mut restored = FormState::new(&config);
    snapshots.load(&mut restored, &config).unwrap();
    assert_eq!(restored.field("f_name"), Some("Browser"));
}
