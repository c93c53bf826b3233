//! HTTP server implementation.
//!
//! This module provides the axum-based HTTP server that exposes the JSON REST
//! API, the htmx fragments used by the web page, and the static assets.

use axum::{
    Router,
    extract::{
        Form, Path, Query, State,
        rejection::{FormRejection, JsonRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::templates;
use crate::config::ServerConfig;
use crate::error::{TodoError, TodoResult};
use crate::store::TodoStore;
use crate::types::{CreateTodo, Filter, Todo, TodoId, UpdateTodo};
use crate::view::{Notification, NotificationKind, ViewState, render};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TodoStore>,
    static_dir: PathBuf,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            static_dir: static_dir.into(),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &dyn TodoStore {
        self.store.as_ref()
    }

    /// Directory static assets are served from.
    pub fn static_dir(&self) -> &FsPath {
        &self.static_dir
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Path ids must be plain decimal digits; anything else is treated like an
/// id that does not exist.
fn parse_id(raw: &str) -> TodoResult<TodoId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TodoError::unknown_id());
    }
    raw.parse().map_err(|_| TodoError::unknown_id())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> TodoResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| TodoError::invalid_body(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.store().list())
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TodoResult<Json<Todo>> {
    let id = parse_id(&id)?;
    state.store().get(id).map(Json)
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> TodoResult<(StatusCode, Json<Todo>)> {
    let request = json_body(body)?;
    let text = request.text.ok_or_else(TodoError::text_required)?;
    let todo = state.store().create(&text)?;
    info!(id = todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTodo>, JsonRejection>,
) -> TodoResult<Json<Todo>> {
    let patch = json_body(body)?;
    let id = parse_id(&id)?;
    let todo = state.store().update(id, patch)?;
    info!(id, completed = todo.completed, "Todo updated");
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TodoResult<StatusCode> {
    let id = parse_id(&id)?;
    state.store().delete(id)?;
    info!(id, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Web page
// ---------------------------------------------------------------------------

/// Root endpoint - serves `index.html` from the static directory, or the
/// embedded page when the directory has none.
async fn root(State(state): State<AppState>) -> Html<String> {
    let index = state.static_dir().join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(page) => Html(page),
        Err(e) => {
            debug!(path = %index.display(), error = %e, "Serving embedded index page");
            Html(templates::INDEX_TEMPLATE.to_string())
        }
    }
}

/// Query parameters shared by the htmx routes.
#[derive(Debug, Default, serde::Deserialize)]
struct ViewParams {
    filter: Option<String>,
}

impl ViewParams {
    fn view_state(&self) -> ViewState {
        let filter = self
            .filter
            .as_deref()
            .and_then(|f| f.parse::<Filter>().ok())
            .unwrap_or_default();
        ViewState::new(filter)
    }
}

/// Form data for the add form.
///
/// The form carries the current filter in a hidden field kept up to date by
/// every fragment.
#[derive(Debug, serde::Deserialize)]
struct AddForm {
    text: Option<String>,
    filter: Option<String>,
}

/// Form data for the edit button.
#[derive(Debug, Default, serde::Deserialize)]
struct EditForm {
    text: Option<String>,
}

/// Re-render the list, with an optional out-of-band notification.
fn fragment(state: &AppState, view: ViewState, notification: Option<Notification>) -> Html<String> {
    let mut html = render(&state.store().list(), &view).to_html();
    if let Some(n) = notification {
        html.push_str(&n.to_html());
    }
    Html(html)
}

fn failure(err: &TodoError) -> Notification {
    warn!(code = ?err.code(), "{}", err);
    Notification::new(NotificationKind::Error, err.to_string())
}

/// List fragment for htmx.
async fn ui_list(State(state): State<AppState>, Query(params): Query<ViewParams>) -> Html<String> {
    fragment(&state, params.view_state(), None)
}

/// Handle the add form.
async fn ui_create(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
    Form(form): Form<AddForm>,
) -> Html<String> {
    let params = ViewParams {
        filter: form.filter.or(params.filter),
    };
    let text = form.text.unwrap_or_default();
    let notification = if text.trim().is_empty() {
        Notification::new(NotificationKind::Warning, "Please enter a todo")
    } else {
        match state.store().create(&text) {
            Ok(todo) => {
                info!(id = todo.id, "Todo created from web page");
                Notification::new(NotificationKind::Success, "Todo added")
            }
            Err(e) => failure(&e),
        }
    };
    fragment(&state, params.view_state(), Some(notification))
}

/// Flip the completed flag.
async fn ui_toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ViewParams>,
) -> Html<String> {
    let result = parse_id(&id).and_then(|id| {
        let current = state.store().get(id)?;
        state
            .store()
            .update(id, UpdateTodo::completed(!current.completed))
    });
    let notification = match result {
        Ok(todo) if todo.completed => Notification::new(NotificationKind::Info, "Marked as completed"),
        Ok(_) => Notification::new(NotificationKind::Info, "Marked as active"),
        Err(e) => failure(&e),
    };
    fragment(&state, params.view_state(), Some(notification))
}

/// Replace the text with the answer to the edit prompt.
///
/// The page sends the answer as the form field `text`; an `HX-Prompt` header
/// is accepted as well. A cancelled prompt sends neither. Cancelled, blank and
/// unchanged answers re-render without touching the store.
async fn ui_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ViewParams>,
    headers: HeaderMap,
    form: Result<Form<EditForm>, FormRejection>,
) -> Html<String> {
    let answer = form
        .ok()
        .and_then(|Form(form)| form.text)
        .or_else(|| {
            headers
                .get("hx-prompt")
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        });

    let result = parse_id(&id).and_then(|id| {
        let current = state.store().get(id)?;
        match answer.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() && text != current.text => state
                .store()
                .update(id, UpdateTodo::text(text))
                .map(Some),
            _ => Ok(None),
        }
    });
    let notification = match result {
        Ok(Some(_)) => Some(Notification::new(NotificationKind::Success, "Todo updated")),
        Ok(None) => None,
        Err(e) => Some(failure(&e)),
    };
    fragment(&state, params.view_state(), notification)
}

/// Delete after the page has confirmed with `hx-confirm`.
async fn ui_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ViewParams>,
) -> Html<String> {
    let notification = match parse_id(&id).and_then(|id| state.store().delete(id)) {
        Ok(()) => Notification::new(NotificationKind::Info, "Todo deleted"),
        Err(e) => failure(&e),
    };
    fragment(&state, params.view_state(), Some(notification))
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(state.static_dir());

    Router::new()
        // Page
        .route("/", get(root))
        // htmx fragment routes
        .route("/ui/todos", get(ui_list).post(ui_create))
        .route("/ui/todos/{id}", axum::routing::delete(ui_delete))
        .route("/ui/todos/{id}/toggle", post(ui_toggle))
        .route("/ui/todos/{id}/edit", post(ui_edit))
        // JSON API
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/health", get(health))
        // Everything else comes from the static directory
        .fallback_service(assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:3000`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr())
    }

    /// Trigger graceful shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            warn!("Server task ended abnormally: {}", e);
        }
    }
}

/// Bind the listener and start serving in the background.
///
/// Port 0 binds an ephemeral port; [`ServerHandle::addr`] reports the real one.
pub async fn start_server(
    store: Arc<dyn TodoStore>,
    config: &ServerConfig,
) -> anyhow::Result<ServerHandle> {
    let state = AppState::new(store, config.static_dir.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Todo list listening on http://{}", addr);
    info!("API available at http://{}/api/todos", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Ok(42));
        assert!(parse_id("abc").unwrap_err().is_not_found());
        assert!(parse_id("-1").unwrap_err().is_not_found());
        assert!(parse_id("").unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_id_rejects_signs_padding_and_suffixes() {
        for raw in ["+5", " 42", "42 ", "3abc", "1e3", "99999999999999999999999"] {
            assert!(parse_id(raw).unwrap_err().is_not_found(), "{raw:?}");
        }
    }

    #[test]
    fn test_view_params_fall_back_to_all() {
        let params = ViewParams {
            filter: Some("nonsense".to_string()),
        };
        assert_eq!(params.view_state().filter, Filter::All);

        let params = ViewParams {
            filter: Some("active".to_string()),
        };
        assert_eq!(params.view_state().filter, Filter::Active);
    }
}
