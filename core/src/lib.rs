//! Core of the pocketdo todo list: the record model, the key-value stores the
//! list is persisted to, and the controller that owns the list in memory.

pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::{StoreError, TodoError};
pub use model::todo::{Todo, TodoId};
pub use repository::{
    default_data_dir, FileKeyValueStore, KeyValueStore, KeyedTodoStore, MemoryKeyValueStore,
    TodoStore, TODOS_KEY,
};
pub use service::save_queue::{SaveQueue, SaveTicket};
pub use service::todo_list::TodoList;

/// Opens the list kept under `base_dir`, or under `~/.pocketdo` when `None`.
pub fn open_file_list(base_dir: Option<std::path::PathBuf>) -> anyhow::Result<TodoList> {
    let medium = FileKeyValueStore::new(base_dir)?;
    Ok(TodoList::initialize(KeyedTodoStore::new(medium))?)
}
