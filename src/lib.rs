//! csvcalc - CSV-driven order rows for the web
//!
//! Fetches a CSV file, renders one copy of a marked-up row template per data
//! row, and keeps per-row sums and a grand total up to date as the user types
//! quantities:
//! - Bare comma-separated fields, configurable line endings
//! - Header/footer line trimming
//! - Full-width digit input accepted
//! - Totals kept in memory, mirrored to the page
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { csv_calc } from 'csvcalc';
//! await init();
//! const calc = csv_calc(document.getElementById('order'), 'items.csv', {
//!   only_integer: true,
//! });
//! ```

pub mod csv;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod numeric;
pub mod options;
pub mod template;

// DOM binding (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub mod dom;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use dom::CsvCalc;

pub use csv::{parse_document, CsvDocument};
pub use ledger::{Ledger, QuantityUpdate, RowRecord};
pub use options::{CalcOptions, LineEnding};
pub use template::{RowInstance, TemplateBinding};

/// Deserialize an options object. `undefined` and `null` mean all defaults.
pub(crate) fn options_from_js(options: JsValue) -> error::Result<CalcOptions> {
    if options.is_undefined() || options.is_null() {
        return Ok(CalcOptions::default());
    }
    Ok(serde_wasm_bindgen::from_value(options)?)
}

/// Attach a calculator to `element` and start loading `file`.
///
/// Rows appear once the fetch completes. A failed fetch renders nothing.
///
/// # Errors
/// Returns an error if `options` has a key of the wrong type or the change
/// listener cannot be registered.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn csv_calc(
    element: web_sys::Element,
    file: String,
    options: JsValue,
) -> Result<CsvCalc, JsValue> {
    console_error_panic_hook::set_once();

    let options = options_from_js(options)?;
    let calc = CsvCalc::attach(element, options)?;
    let _ = calc.fetch(file);
    Ok(calc)
}

/// Parse CSV text and return its rows as an array of string arrays.
///
/// # Errors
/// Returns an error if `options` has a key of the wrong type.
#[wasm_bindgen]
pub fn parse_csv(text: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let doc = csv::parse_document(text, &options);

    serde_wasm_bindgen::to_value(&doc.rows)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Route `tracing` output to the browser console.
///
/// `filter` takes `RUST_LOG`-style directives, e.g. `"csvcalc=debug"`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_logging(filter: Option<String>) {
    logging::init_console_logging(filter.as_deref());
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
