use tracing::debug;

use crate::error::StoreError;
use crate::model::todo::Todo;
use crate::repository::traits::{KeyValueStore, TodoStore};

/// Slot the todo list lives under.
pub const TODOS_KEY: &str = "todos";

/// Keeps the whole list as one JSON value under a single key.
#[derive(Clone, Debug)]
pub struct KeyedTodoStore<K: KeyValueStore> {
    medium: K,
    key: String,
}

impl<K: KeyValueStore> KeyedTodoStore<K> {
    pub fn new(medium: K) -> Self {
        Self::with_key(medium, TODOS_KEY)
    }

    pub fn with_key(medium: K, key: &str) -> Self {
        Self {
            medium,
            key: key.to_string(),
        }
    }

    fn persistence_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Persistence {
            key: self.key.clone(),
            source,
        }
    }
}

impl<K: KeyValueStore> TodoStore for KeyedTodoStore<K> {
    fn load(&self) -> Result<Option<Vec<Todo>>, StoreError> {
        let raw = self
            .medium
            .get_item(&self.key)
            .map_err(|e| self.persistence_error(e))?;

        let Some(raw) = raw else {
            debug!(key = %self.key, "no stored todo list");
            return Ok(None);
        };

        let todos: Vec<Todo> =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Deserialization {
                key: self.key.clone(),
                source,
            })?;
        debug!(key = %self.key, count = todos.len(), "loaded todo list");
        Ok(Some(todos))
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec(todos).map_err(StoreError::Serialization)?;
        self.medium
            .set_item(&self.key, &raw)
            .map_err(|e| self.persistence_error(e))?;
        debug!(key = %self.key, count = todos.len(), "saved todo list");
        Ok(())
    }
}
