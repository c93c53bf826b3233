//! Integration tests for the HTTP routes.
//!
//! Requests go straight into the router with `tower::ServiceExt::oneshot`;
//! every test gets a fresh seeded store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use todo_list::store::{MemoryStore, TodoStore};
use todo_list::web::{AppState, build_router};
use tower::ServiceExt;

/// Helper to build a router over a fresh seeded store.
///
/// The static directory points at a path with no files so the embedded page is used.
fn setup() -> (Router, MemoryStore) {
    let store = MemoryStore::seeded();
    let state = AppState::new(Arc::new(store.clone()), "does-not-exist");
    (build_router(state), store)
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

mod json_api {
    use super::*;

    #[tokio::test]
    async fn list_returns_seed_records() {
        let (app, _) = setup();

        let response = send(app, get("/api/todos")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert_eq!(
            body[0],
            json!({"id": 1, "text": "Learn Rust", "completed": true})
        );
    }

    #[tokio::test]
    async fn get_existing_record() {
        let (app, _) = setup();

        let response = send(app, get("/api/todos/3")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": 3, "text": "Deploy to the cloud", "completed": false})
        );
    }

    #[tokio::test]
    async fn get_unknown_record_is_404() {
        let (app, _) = setup();

        let response = send(app, get("/api/todos/42")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "Todo not found"}));
    }

    #[tokio::test]
    async fn non_numeric_id_is_404() {
        let (app, _) = setup();

        let response = send(app, get("/api/todos/abc")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "Todo not found"}));
    }

    #[tokio::test]
    async fn create_returns_201_with_record() {
        let (app, store) = setup();

        let response = send(
            app,
            json_request("POST", "/api/todos", json!({"text": "  x  "})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"id": 5, "text": "x", "completed": false})
        );
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn create_without_text_is_400() {
        for body in [json!({}), json!({"text": ""}), json!({"text": "   "})] {
            let (app, store) = setup();

            let response = send(app, json_request("POST", "/api/todos", body)).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_json(response).await,
                json!({"error": "Todo text is required"})
            );
            assert_eq!(store.len(), 4);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (app, store) = setup();

        let response = send(app, raw_json_request("POST", "/api/todos", "{not json")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn update_completed_only() {
        let (app, store) = setup();

        let response = send(
            app,
            json_request("PUT", "/api/todos/3", json!({"completed": true})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": 3, "text": "Deploy to the cloud", "completed": true})
        );
        assert!(!store.get(4).unwrap().completed);
    }

    #[tokio::test]
    async fn update_text_only_trims() {
        let (app, store) = setup();

        let response = send(
            app,
            json_request("PUT", "/api/todos/1", json!({"text": " Learn Rust well "})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let todo = store.get(1).unwrap();
        assert_eq!(todo.text, "Learn Rust well");
        assert!(todo.completed);
    }

    #[tokio::test]
    async fn update_with_wrong_type_is_400() {
        let (app, store) = setup();

        let response = send(
            app,
            json_request("PUT", "/api/todos/3", json!({"completed": "yes"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!store.get(3).unwrap().completed);
    }

    #[tokio::test]
    async fn update_unknown_is_404() {
        let (app, store) = setup();

        let response = send(
            app,
            json_request("PUT", "/api/todos/99", json!({"completed": true})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "Todo not found"}));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn delete_returns_204_with_empty_body() {
        let (app, store) = setup();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/todos/2")
            .body(Body::empty())
            .unwrap();
        let response = send(app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());
        assert_eq!(store.len(), 3);
        assert!(store.get(2).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_unknown_is_404() {
        let (app, _) = setup();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/todos/77")
            .body(Body::empty())
            .unwrap();
        let response = send(app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_check_returns_json() {
        let (app, _) = setup();

        let response = send(app, get("/api/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }
}

mod web_page {
    use super::*;

    #[tokio::test]
    async fn root_serves_embedded_page() {
        let (app, _) = setup();

        let response = send(app, get("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"id="todo-app""#));
    }

    #[tokio::test]
    async fn root_prefers_static_index() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>custom page</p>").unwrap();
        std::fs::write(dir.path().join("app.css"), "body{}").unwrap();
        let state = AppState::new(Arc::new(MemoryStore::seeded()), dir.path());
        let app = build_router(state);

        let response = send(app.clone(), get("/")).await;
        assert_eq!(body_text(response).await, "<p>custom page</p>");

        let response = send(app, get("/app.css")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body{}");
    }

    #[tokio::test]
    async fn missing_asset_is_404() {
        let (app, _) = setup();

        let response = send(app, get("/nope.js")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_fragment_applies_filter() {
        let (app, _) = setup();

        let response = send(app, get("/ui/todos?filter=active")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("todo-3"));
        assert!(html.contains("todo-4"));
        assert!(!html.contains("todo-1"));
        assert!(html.contains(r#"<span class="stat-value" id="totalCount">4</span>"#));
    }

    #[tokio::test]
    async fn add_form_creates_and_notifies() {
        let (app, store) = setup();

        let response = send(
            app,
            form_request("POST", "/ui/todos", "text=%3Cb%3Ebold%3C%2Fb%3E"),
        )
        .await;

        let html = body_text(response).await;
        assert_eq!(store.get(5).unwrap().text, "<b>bold</b>");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains(r#"class="notification success""#));
    }

    #[tokio::test]
    async fn add_form_with_blank_text_warns() {
        let (app, store) = setup();

        let response = send(app, form_request("POST", "/ui/todos", "text=+++")).await;

        assert!(body_text(response).await.contains("notification warning"));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn toggle_flips_completed() {
        let (app, store) = setup();

        let response = send(app, form_request("POST", "/ui/todos/3/toggle", "")).await;

        assert!(body_text(response).await.contains("Marked as completed"));
        assert!(store.get(3).unwrap().completed);
    }

    #[tokio::test]
    async fn toggle_unknown_shows_error() {
        let (app, _) = setup();

        let response = send(app, form_request("POST", "/ui/todos/99/toggle", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("notification error"));
    }

    #[tokio::test]
    async fn edit_uses_prompt_header() {
        let (app, store) = setup();

        let request = Request::builder()
            .method("POST")
            .uri("/ui/todos/4/edit")
            .header("HX-Prompt", "  Add even more features ")
            .body(Body::empty())
            .unwrap();
        let response = send(app, request).await;

        assert!(body_text(response).await.contains("Todo updated"));
        assert_eq!(store.get(4).unwrap().text, "Add even more features");
    }

    #[tokio::test]
    async fn edit_without_prompt_answer_is_noop() {
        let (app, store) = setup();

        let response = send(app, form_request("POST", "/ui/todos/4/edit", "")).await;

        let html = body_text(response).await;
        assert!(!html.contains("notification"));
        assert_eq!(store.get(4).unwrap().text, "Add more features");
    }

    #[tokio::test]
    async fn delete_fragment_removes_record() {
        let (app, store) = setup();

        let request = Request::builder()
            .method("DELETE")
            .uri("/ui/todos/1?filter=completed")
            .body(Body::empty())
            .unwrap();
        let response = send(app, request).await;

        let html = body_text(response).await;
        assert!(html.contains("Todo deleted"));
        assert!(html.contains("todo-2"));
        assert!(!html.contains("todo-1"));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn add_form_keeps_current_filter() {
        let (app, store) = setup();

        let response = send(
            app,
            form_request("POST", "/ui/todos", "text=new&filter=completed"),
        )
        .await;

        let html = body_text(response).await;
        assert_eq!(store.len(), 5);
        assert!(html.contains(r#"class="filter-btn active" data-filter="completed""#));
        assert!(html.contains(r#"name="filter" value="completed""#));
        assert!(!html.contains("todo-5"));
    }

    #[tokio::test]
    async fn edit_uses_form_answer() {
        let (app, store) = setup();

        let response = send(
            app,
            form_request("POST", "/ui/todos/3/edit?filter=active", "text=Deploy+to+production"),
        )
        .await;

        let html = body_text(response).await;
        assert!(html.contains("Todo updated"));
        assert!(html.contains(r#"data-text="Deploy to production""#));
        assert_eq!(store.get(3).unwrap().text, "Deploy to production");
    }
}

mod path_ids {
    use super::*;

    #[tokio::test]
    async fn ids_with_signs_or_suffixes_are_404() {
        for uri in ["/api/todos/+1", "/api/todos/1abc", "/api/todos/%201"] {
            let (app, _) = setup();

            let response = send(app, get(uri)).await;

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
