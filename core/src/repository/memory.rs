use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::repository::traits::KeyValueStore;

/// In-process medium. Clones share the same contents, so a handle kept by the
/// caller can inspect what a store moved onto the writer thread has written.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyValueStore {
    items: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every `set_item` fails as if the medium were full.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Stores a raw value directly, bypassing the reject flag.
    pub fn insert_raw(&self, key: &str, value: impl AsRef<[u8]>) {
        self.items
            .lock()
            .insert(key.to_string(), value.as_ref().to_vec());
    }

    /// Stored value as text, with invalid UTF-8 replaced.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &[u8]) -> io::Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("storage quota exceeded"));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}
