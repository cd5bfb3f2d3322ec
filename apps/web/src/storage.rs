//! `window.localStorage` as a key-value substrate, plus the cross-tab bridge.
//!
//! The browser fires `storage` on every *other* tab of the origin after a
//! write. [`StorageEventListener`] forwards those to the in-process bus so the
//! home-city store re-reads the same way it does for in-process contexts.

use techno_beacon::storage::{
    KeyValueStore, Namespaced, StorageChange, StorageError, StorageEvents, StorageKey,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(describe(&e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // setItem only throws for QuotaExceededError in practice
        self.storage
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded {
                key: key.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(describe(&e)))
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Window `storage` listener that detaches itself when dropped.
pub struct StorageEventListener {
    window: web_sys::Window,
    callback: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl StorageEventListener {
    /// Publish every browser storage event under `namespace` to `events` as an
    /// external change. Keys outside the namespace, or ones the app never
    /// writes, are ignored.
    pub fn attach<S: 'static>(namespace: Namespaced<S>, events: StorageEvents) -> Option<Self> {
        let window = web_sys::window()?;
        let callback: Closure<dyn FnMut(web_sys::StorageEvent)> =
            Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
                let change = match event.key() {
                    None => StorageChange::cleared(),
                    Some(raw_key) => match namespace.strip(&raw_key).and_then(StorageKey::parse) {
                        Some(key) => {
                            StorageChange::new(key.as_str(), event.old_value(), event.new_value())
                        }
                        None => return,
                    },
                };
                log::debug!("storage event from another tab: {:?}", change.key);
                events.publish(None, &change);
            }));

        window
            .add_event_listener_with_callback("storage", callback.as_ref().unchecked_ref())
            .ok()?;

        Some(Self { window, callback })
    }
}

impl Drop for StorageEventListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("storage", self.callback.as_ref().unchecked_ref());
    }
}
