use std::error::Error;

use tracing::{debug, warn};

use crate::error::{StoreError, TodoError};
use crate::model::todo::{Todo, TodoId};
use crate::repository::TodoStore;
use crate::service::save_queue::{SaveQueue, SaveTicket};

/// Owner of the in-memory todo list.
///
/// The only constructor is [`TodoList::initialize`], which loads the stored
/// list before anything else can touch it. Every successful mutation updates
/// memory first and then queues exactly one save of the full snapshot.
pub struct TodoList {
    todos: Vec<Todo>,
    draft: String,
    saves: SaveQueue,
}

impl TodoList {
    /// Loads the stored list and hands the store over to the save writer.
    ///
    /// A missing value starts an empty list. A corrupt value also starts an
    /// empty list and is overwritten by the first save. Read failures of the
    /// medium itself are returned.
    pub fn initialize<S>(store: S) -> Result<Self, StoreError>
    where
        S: TodoStore + Send + 'static,
    {
        let mut todos = match store.load() {
            Ok(Some(todos)) => todos,
            Ok(None) => Vec::new(),
            Err(err @ StoreError::Deserialization { .. }) => {
                warn!(error = &err as &dyn Error, "stored todo list is unreadable, starting empty");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let loaded = todos.len();
        todos.retain(|t| !t.text.trim().is_empty());
        if todos.len() != loaded {
            warn!(dropped = loaded - todos.len(), "ignored stored items without text");
        }
        debug!(count = todos.len(), "todo list ready");

        Ok(Self {
            todos,
            draft: String::new(),
            saves: SaveQueue::spawn(store),
        })
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Number of items not yet done.
    pub fn remaining(&self) -> usize {
        self.todos.iter().filter(|t| !t.done).count()
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: TodoId) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    pub fn id_at(&self, index: usize) -> Result<TodoId, TodoError> {
        self.todos
            .get(index)
            .map(|t| t.id)
            .ok_or(TodoError::InvalidIndex {
                index,
                len: self.todos.len(),
            })
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Appends the trimmed text as an open item.
    ///
    /// Blank input is not an error: nothing changes and `None` is returned.
    pub fn add(&mut self, raw: &str) -> Option<SaveTicket> {
        let todo = Todo::new(raw)?;
        debug!(id = %todo.id, "adding todo");
        self.todos.push(todo);
        self.draft.clear();
        Some(self.persist())
    }

    /// Adds whatever is in the draft; the draft is cleared only on success.
    pub fn submit_draft(&mut self) -> Option<SaveTicket> {
        let draft = self.draft.clone();
        self.add(&draft)
    }

    pub fn toggle(&mut self, id: TodoId) -> Result<SaveTicket, TodoError> {
        let pos = self.position(id).ok_or(TodoError::UnknownTodo(id))?;
        self.todos[pos].toggle();
        debug!(%id, done = self.todos[pos].done, "toggled todo");
        Ok(self.persist())
    }

    pub fn toggle_at(&mut self, index: usize) -> Result<SaveTicket, TodoError> {
        let id = self.id_at(index)?;
        self.toggle(id)
    }

    /// Removes the item; everything after it moves up one position.
    pub fn delete(&mut self, id: TodoId) -> Result<SaveTicket, TodoError> {
        let pos = self.position(id).ok_or(TodoError::UnknownTodo(id))?;
        self.todos.remove(pos);
        debug!(%id, "deleted todo");
        Ok(self.persist())
    }

    pub fn delete_at(&mut self, index: usize) -> Result<SaveTicket, TodoError> {
        let id = self.id_at(index)?;
        self.delete(id)
    }

    fn persist(&mut self) -> SaveTicket {
        self.saves.enqueue(self.todos.clone())
    }
}
