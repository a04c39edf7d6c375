use std::io;

use crate::error::StoreError;
use crate::model::todo::Todo;

/// String-keyed persistent medium holding one value per key.
pub trait KeyValueStore {
    /// Raw stored bytes; decoding is left to the caller.
    fn get_item(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    /// Replaces any previous value under `key`. Readers never observe a partial value.
    fn set_item(&self, key: &str, value: &[u8]) -> io::Result<()>;
}

/// Whole-snapshot persistence for the todo list.
pub trait TodoStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<Todo>>, StoreError>;
    fn save(&self, todos: &[Todo]) -> Result<(), StoreError>;
}
