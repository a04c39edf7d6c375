pub mod file;
pub mod keyed;
pub mod memory;
pub mod traits;

// Re-export
pub use file::{default_data_dir, FileKeyValueStore};
pub use keyed::{KeyedTodoStore, TODOS_KEY};
pub use memory::MemoryKeyValueStore;
pub use traits::{KeyValueStore, TodoStore};
