use std::cell::RefCell;
use std::collections::HashMap;

/// String key-value storage with the semantics of `window.localStorage`:
/// reads of missing keys yield `None`, write failures are absorbed.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use serde_json::json;
    use web_sys::{window, Storage};

    use super::{KeyValueStore, MemoryStore};
    use crate::logging::{log_event, LogLevel};

    enum Backing {
        Browser(Storage),
        Session(MemoryStore),
    }

    /// `window.localStorage`, or an in-memory map for the rest of the session
    /// when the browser refuses storage access.
    pub struct LocalStore {
        backing: Backing,
    }

    impl LocalStore {
        pub fn open() -> Self {
            let backing = match window().and_then(|win| win.local_storage().ok().flatten()) {
                Some(storage) => Backing::Browser(storage),
                None => {
                    log_event(LogLevel::Warn, "storage_unavailable", json!({ "fallback": "memory" }));
                    Backing::Session(MemoryStore::new())
                }
            };
            Self { backing }
        }
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Option<String> {
            match &self.backing {
                Backing::Browser(storage) => storage.get_item(key).ok().flatten(),
                Backing::Session(memory) => memory.get(key),
            }
        }

        fn set(&self, key: &str, value: &str) {
            match &self.backing {
                Backing::Browser(storage) => {
                    if storage.set_item(key, value).is_err() {
                        log_event(LogLevel::Warn, "storage_write_failed", json!({ "key": key }));
                    }
                }
                Backing::Session(memory) => memory.set(key, value),
            }
        }

        fn remove(&self, key: &str) {
            match &self.backing {
                Backing::Browser(storage) => {
                    if storage.remove_item(key).is_err() {
                        log_event(LogLevel::Warn, "storage_remove_failed", json!({ "key": key }));
                    }
                }
                Backing::Session(memory) => memory.remove(key),
            }
        }
    }
}
