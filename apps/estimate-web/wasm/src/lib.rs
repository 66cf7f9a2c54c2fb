//! WASM bindings for the estimate form
//!
//! All form state lives in Rust via `EstimateSession`; JavaScript only
//! loads the module and mounts the session.
//!
//! ## Architecture
//!
//! - Totals, counter, snapshots and PDF assembly in `estimate-core`
//! - `localStorage` behind the core `KvStore` trait
//! - DOM rendering and event wiring in `dom` / `session`
//! - Rasterization through the page's `html2canvas` global
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EstimateSession } from './pkg/estimate_wasm.js';
//!
//! await init();
//!
//! const session = new EstimateSession({ row_count: 25 });
//! session.mount();
//! window.estimate = session; // keep the event handlers alive
//! ```

pub mod dom;
pub mod export;
pub mod session;
pub mod storage;

use estimate_core::{format_money, parse_price, Totals};
use wasm_bindgen::prelude::*;

pub use session::EstimateSession;
pub use storage::LocalStorage;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse a price cell the way the totals do
#[wasm_bindgen(js_name = parsePrice)]
pub fn parse_price_js(input: &str) -> f64 {
    parse_price(input)
}

/// Compute totals for a list of price strings without a mounted form
#[wasm_bindgen(js_name = computeTotals)]
pub fn compute_totals(prices: Vec<String>, tax_rate: f64) -> Result<JsValue, JsValue> {
    let display = Totals::compute(&prices, tax_rate).display();
    serde_wasm_bindgen::to_value(&display)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Format a number with two decimals
#[wasm_bindgen(js_name = formatMoney)]
pub fn format_money_js(value: f64) -> String {
    format_money(value)
}
