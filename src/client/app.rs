//! Client-side todo list state.

use std::time::{Duration, Instant};

use tracing::{error, info};

use super::{ClientError, Dialogs, TodoApi};
use crate::types::{Filter, Todo, TodoId, UpdateTodo};
use crate::view::{
    DEFAULT_NOTIFICATION_TTL, DELETE_CONFIRMATION, EDIT_PROMPT, Notification, NotificationKind,
    Notifier, RenderedView, ViewState, render,
};

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server accepted the change and the local copy was patched.
    Applied,
    /// Nothing was sent: invalid input, unknown id, or the user backed out.
    Skipped,
    /// The request failed; local state is unchanged.
    Failed,
}

/// Local copy of the collection plus view settings and notifications.
///
/// Mutations go to the server first; the cache is patched with the record the
/// server returns, never ahead of it.
pub struct TodoApp<A> {
    api: A,
    todos: Vec<Todo>,
    view: ViewState,
    notifier: Notifier,
}

impl<A: TodoApi> TodoApp<A> {
    pub fn new(api: A) -> Self {
        Self::with_notification_ttl(api, DEFAULT_NOTIFICATION_TTL)
    }

    pub fn with_notification_ttl(api: A, ttl: Duration) -> Self {
        Self {
            api,
            todos: Vec::new(),
            view: ViewState::default(),
            notifier: Notifier::new(ttl),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The cached collection.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Switch the filter. The cache is left as is.
    pub fn set_filter(&mut self, filter: Filter) {
        self.view = self.view.with_filter(filter);
    }

    /// Render the cache under the current view.
    pub fn render(&self) -> RenderedView {
        render(&self.todos, &self.view)
    }

    /// The notification still visible now, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.notifier.current(Instant::now())
    }

    /// The last notification shown, even if it has expired.
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifier.last()
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifier
            .show(Notification::new(kind, message), Instant::now());
    }

    fn fail(&mut self, action: &str, err: ClientError, message: &str) -> ActionOutcome {
        error!(action, "{}", err);
        self.notify(NotificationKind::Error, message);
        ActionOutcome::Failed
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    fn missing(&mut self, id: TodoId) -> ActionOutcome {
        self.notify(NotificationKind::Warning, format!("No todo with id {}", id));
        ActionOutcome::Skipped
    }

    /// Replace the cache with the server's collection.
    pub async fn load(&mut self) -> ActionOutcome {
        match self.api.list().await {
            Ok(todos) => {
                info!(count = todos.len(), "Loaded todos");
                self.todos = todos;
                ActionOutcome::Applied
            }
            Err(e) => self.fail("load", e, "Could not load todos"),
        }
    }

    /// Create a todo from user input.
    pub async fn add(&mut self, input: &str) -> ActionOutcome {
        let text = input.trim();
        if text.is_empty() {
            self.notify(NotificationKind::Warning, "Please enter a todo");
            return ActionOutcome::Skipped;
        }

        match self.api.create(text).await {
            Ok(todo) => {
                info!(id = todo.id, "Added todo");
                self.todos.push(todo);
                self.notify(NotificationKind::Success, "Todo added");
                ActionOutcome::Applied
            }
            Err(e) => self.fail("add", e, "Failed to add todo, please try again"),
        }
    }

    /// Flip the completed flag of a cached todo.
    pub async fn toggle(&mut self, id: TodoId) -> ActionOutcome {
        let Some(index) = self.position(id) else {
            return self.missing(id);
        };
        let patch = UpdateTodo::completed(!self.todos[index].completed);

        match self.api.update(id, &patch).await {
            Ok(todo) => {
                let message = if todo.completed {
                    "Marked as completed"
                } else {
                    "Marked as active"
                };
                self.replace(todo);
                self.notify(NotificationKind::Info, message);
                ActionOutcome::Applied
            }
            Err(e) => self.fail("toggle", e, "Failed to update todo, please try again"),
        }
    }

    /// Ask for new text and save it.
    ///
    /// Cancelling, or answering with blank or unchanged text, sends nothing.
    pub async fn edit<D>(&mut self, id: TodoId, dialogs: &mut D) -> ActionOutcome
    where
        D: Dialogs + ?Sized,
    {
        let Some(index) = self.position(id) else {
            return self.missing(id);
        };
        let current = self.todos[index].text.clone();

        let Some(answer) = dialogs.prompt(EDIT_PROMPT, &current) else {
            return ActionOutcome::Skipped;
        };
        let text = answer.trim();
        if text.is_empty() || text == current {
            return ActionOutcome::Skipped;
        }

        match self.api.update(id, &UpdateTodo::text(text)).await {
            Ok(todo) => {
                self.replace(todo);
                self.notify(NotificationKind::Success, "Todo updated");
                ActionOutcome::Applied
            }
            Err(e) => self.fail("edit", e, "Failed to edit todo, please try again"),
        }
    }

    /// Delete a todo once the user confirms.
    pub async fn delete<D>(&mut self, id: TodoId, dialogs: &mut D) -> ActionOutcome
    where
        D: Dialogs + ?Sized,
    {
        if self.position(id).is_none() {
            return self.missing(id);
        }
        if !dialogs
            .confirm(DELETE_CONFIRMATION)
            .is_confirmed()
        {
            return ActionOutcome::Skipped;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                self.notify(NotificationKind::Info, "Todo deleted");
                ActionOutcome::Applied
            }
            Err(e) => self.fail("delete", e, "Failed to delete todo, please try again"),
        }
    }

    fn replace(&mut self, todo: Todo) {
        if let Some(index) = self.position(todo.id) {
            self.todos[index] = todo;
        }
    }
}
