use chatlane_chat::{DurableStore, StorageError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Durable store backed by the browser's localStorage
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self {
            storage: crate::local_storage()?,
        })
    }
}

impl DurableStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {} from localStorage: {:?}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Quota errors surface here
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }
}
