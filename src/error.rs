//! Structured error types for csvcalc.
//!
//! Only option errors ever reach the JavaScript caller; fetch and DOM
//! failures are logged and swallowed by the render task.

/// All errors that can occur while configuring or rendering a calculator.
#[derive(Debug, thiserror::Error)]
pub enum CsvCalcError {
    /// The options object could not be deserialized.
    #[error("Invalid options: {0}")]
    Options(String),

    /// Fetching the CSV resource failed.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The host markup did not match the template contract.
    #[error("DOM error: {0}")]
    Dom(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CsvCalcError>;

impl From<String> for CsvCalcError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for CsvCalcError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for CsvCalcError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::Options(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<CsvCalcError> for wasm_bindgen::JsValue {
    fn from(e: CsvCalcError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
