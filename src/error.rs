use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GisError {
    #[error("unknown layer `{0}`")]
    UnknownLayer(String),
    #[error("viewport {width}x{height} is too small to rasterize")]
    DegenerateViewport { width: u32, height: u32 },
    #[error("browser: {0}")]
    Dom(String),
}

#[cfg(target_arch = "wasm32")]
impl From<GisError> for wasm_bindgen::JsValue {
    fn from(err: GisError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
