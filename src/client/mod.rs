//! Client side of the todo list.
//!
//! [`TodoApp`] keeps a local copy of the collection and only changes it after
//! the server has confirmed a mutation. It talks to the server through the
//! [`TodoApi`] trait; [`HttpApi`] is the reqwest implementation.

mod app;
mod dialogs;
mod http;

pub use app::{ActionOutcome, TodoApp};
pub use dialogs::{Confirmation, Dialogs, FixedDialogs, TerminalDialogs};
pub use http::HttpApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Todo, TodoId, UpdateTodo};

/// Errors seen by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not what the API promises.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Remote operations the client view performs.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// Fetch the full collection.
    async fn list(&self) -> ClientResult<Vec<Todo>>;

    /// Create a todo and return the stored record.
    async fn create(&self, text: &str) -> ClientResult<Todo>;

    /// Apply a partial update and return the stored record.
    async fn update(&self, id: TodoId, patch: &UpdateTodo) -> ClientResult<Todo>;

    /// Delete a todo.
    async fn delete(&self, id: TodoId) -> ClientResult<()>;
}
