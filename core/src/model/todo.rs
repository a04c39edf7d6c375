use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-local handle for a [`Todo`].
///
/// Ids are not part of the stored layout; every load hands out fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        TodoId(Uuid::new_v4())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        TodoId::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Todo {
    #[serde(skip)]
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Todo {
    /// Builds an open item from raw input, or `None` when the input is blank.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: TodoId::new(),
            text: text.to_string(),
            done: false,
        })
    }

    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}
