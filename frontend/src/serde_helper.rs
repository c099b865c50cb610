use js_sys::wasm_bindgen::JsValue;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error type for JS value conversions
#[derive(Debug, Error)]
pub enum Error {
    #[error("serde-wasm-bindgen: {0}")]
    SerdeWasmBindgen(#[from] serde_wasm_bindgen::Error),
    #[error("value is undefined or null")]
    Missing,
}

/// Deserialize a JsValue into a Rust data structure
///
/// `undefined`/`null` are reported as [`Error::Missing`] instead of a type error.
pub fn from_value<T: DeserializeOwned>(value: JsValue) -> Result<T, Error> {
    if value.is_undefined() || value.is_null() {
        return Err(Error::Missing);
    }
    serde_wasm_bindgen::from_value(value).map_err(Error::from)
}
