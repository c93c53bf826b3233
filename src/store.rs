//! Todo storage.
//!
//! The [`TodoStore`] trait is the seam between the HTTP layer and the
//! collection. [`MemoryStore`] keeps the records in a process-local vector;
//! state is lost when the process exits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{TodoError, TodoResult};
use crate::types::{Todo, TodoId, UpdateTodo};

/// Operations the API layer needs from a todo collection.
pub trait TodoStore: Send + Sync {
    /// All todos in insertion order.
    fn list(&self) -> Vec<Todo>;

    /// Look up a single todo.
    fn get(&self, id: TodoId) -> TodoResult<Todo>;

    /// Append a new todo with trimmed `text` and `completed = false`.
    fn create(&self, text: &str) -> TodoResult<Todo>;

    /// Apply the fields present in `patch` and return the updated record.
    fn update(&self, id: TodoId, patch: UpdateTodo) -> TodoResult<Todo>;

    /// Remove a todo.
    fn delete(&self, id: TodoId) -> TodoResult<()>;
}

/// The records a freshly started server begins with.
pub fn seed_todos() -> Vec<Todo> {
    vec![
        Todo::new(1, "Learn Rust", true),
        Todo::new(2, "Build the todo list app", true),
        Todo::new(3, "Deploy to the cloud", false),
        Todo::new(4, "Add more features", false),
    ]
}

struct Inner {
    todos: Vec<Todo>,
    /// Highest id ever assigned, so ids of deleted records are never handed out again.
    last_id: TodoId,
}

impl Inner {
    fn position(&self, id: TodoId) -> TodoResult<usize> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::not_found(id))
    }
}

/// In-memory store handle. Clones share the same collection.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Create a store holding the default seed records.
    pub fn seeded() -> Self {
        Self::with_todos(seed_todos())
    }

    /// Create a store holding `todos` in the given order.
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let last_id = todos.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            inner: Arc::new(Mutex::new(Inner { todos, last_id })),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic mid-operation cannot leave a half-written record behind, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore for MemoryStore {
    fn list(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    fn get(&self, id: TodoId) -> TodoResult<Todo> {
        let inner = self.lock();
        let index = inner.position(id)?;
        Ok(inner.todos[index].clone())
    }

    fn create(&self, text: &str) -> TodoResult<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::text_required());
        }

        let mut inner = self.lock();
        let id = inner.last_id + 1;
        inner.last_id = id;

        let todo = Todo::new(id, text, false);
        inner.todos.push(todo.clone());
        debug!(id, "Created todo");
        Ok(todo)
    }

    fn update(&self, id: TodoId, patch: UpdateTodo) -> TodoResult<Todo> {
        let mut inner = self.lock();
        let index = inner.position(id)?;
        let todo = &mut inner.todos[index];

        if let Some(text) = patch.text {
            todo.text = text.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }

        debug!(id, completed = todo.completed, "Updated todo");
        Ok(todo.clone())
    }

    fn delete(&self, id: TodoId) -> TodoResult<()> {
        let mut inner = self.lock();
        let index = inner.position(id)?;
        inner.todos.remove(index);
        debug!(id, "Deleted todo");
        Ok(())
    }
}
