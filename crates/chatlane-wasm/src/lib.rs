use wasm_bindgen::prelude::*;
use web_sys::{Storage, Window};

mod gateway;
mod handle;
mod storage;

pub use gateway::RelayGateway;
pub use handle::ChatHandle;
pub use storage::LocalStorageStore;

/// Initialize the WASM module
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Chatlane WASM initialized");
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the page's localStorage
fn local_storage() -> Result<Storage, JsValue> {
    window()?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage is not available"))
}
