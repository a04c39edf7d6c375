pub mod save_queue;
pub mod todo_list;
