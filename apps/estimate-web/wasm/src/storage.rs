//! `localStorage` backing for the core key-value store

use estimate_core::{EstimateError, KvStore};
use wasm_bindgen::JsValue;

/// Handle to the window's `localStorage`
#[derive(Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let storage = window.local_storage()?.ok_or("No localStorage")?;
        Ok(Self { storage })
    }
}

fn storage_error(e: JsValue) -> EstimateError {
    EstimateError::Storage(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl KvStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, EstimateError> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EstimateError> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<(), EstimateError> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}
