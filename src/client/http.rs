//! reqwest implementation of [`TodoApi`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ClientError, ClientResult, TodoApi};
use crate::error::ErrorBody;
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

/// HTTP client for the `/api/todos` endpoints.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/api/todos/{}", self.base_url, id)
    }
}

/// Turn a non-success response into [`ClientError::Status`], using the
/// server's `{"error": ...}` message when there is one.
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ClientError::status(status.as_u16(), message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl TodoApi for HttpApi {
    async fn list(&self) -> ClientResult<Vec<Todo>> {
        debug!(url = %self.todos_url(), "GET");
        let response = check(self.http.get(self.todos_url()).send().await?).await?;
        decode(response).await
    }

    async fn create(&self, text: &str) -> ClientResult<Todo> {
        debug!(url = %self.todos_url(), "POST");
        let response = self
            .http
            .post(self.todos_url())
            .json(&CreateTodo::new(text))
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn update(&self, id: TodoId, patch: &UpdateTodo) -> ClientResult<Todo> {
        debug!(url = %self.todo_url(id), "PUT");
        let response = self.http.put(self.todo_url(id)).json(patch).send().await?;
        decode(check(response).await?).await
    }

    async fn delete(&self, id: TodoId) -> ClientResult<()> {
        debug!(url = %self.todo_url(id), "DELETE");
        let response = self.http.delete(self.todo_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://localhost:3000/");
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.todos_url(), "http://localhost:3000/api/todos");
        assert_eq!(api.todo_url(7), "http://localhost:3000/api/todos/7");
    }
}
