use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::domain::ports::StateStore;

/// In-process [`StateStore`]: a mutex-guarded map. The default store for
/// embedders without a platform-specific backing store, and the store every
/// test uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, key: &str, value: &Value) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.clone());
    }

    fn load(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn clear_all(&self) {
        self.entries.lock().unwrap().clear();
    }
}
