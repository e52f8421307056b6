// Router construction

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let notebook = Router::new()
        .route("/health", get(handlers::notebook_health))
        .route("/list", get(handlers::list_notebooks))
        .route("/create", post(handlers::create_notebook))
        .route("/statistics", get(handlers::statistics))
        .route("/add_record", post(handlers::add_record))
        .route("/generate_title", post(handlers::generate_title))
        .route(
            "/:id",
            get(handlers::get_notebook)
                .put(handlers::update_notebook)
                .delete(handlers::delete_notebook),
        )
        .route("/:id/records", post(handlers::add_record_to_notebook))
        .route("/:id/records/:record_id", delete(handlers::remove_record));

    let research = Router::new()
        .route("/ppt_outline", post(handlers::ppt_outline))
        .route("/ppt_image", post(handlers::ppt_image))
        .route("/ppt_config", get(handlers::ppt_config))
        .route("/ppt_style_templates", get(handlers::ppt_style_templates));

    let mut app = Router::new()
        .route("/api/v1/health", get(handlers::health))
        .nest("/api/v1/notebook", notebook)
        .nest("/api/v1/research", research)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes));

    // Allow any origin for local development
    if server.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use notebook_deck_core::{Deck, ImageResponse, Notebook, NotebookListResponse};
    use notebook_deck_generation_client::{ChatSettings, ImageSettings};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{AppConfig, DeckSettings};

    fn deck_settings(enabled: bool, base_url: &str) -> DeckSettings {
        let mut template = notebook_deck_core::StyleTemplate::new();
        template.insert("name".to_string(), "Minimal".to_string());
        template.insert("prompt".to_string(), "white background".to_string());
        DeckSettings {
            enabled,
            max_slides: 4,
            style_templates: vec![template],
            default_style_prompt: None,
            outline: ChatSettings {
                model: "chat-model".to_string(),
                api_key: None,
                base_url: base_url.to_string(),
                binding: "openai".to_string(),
                temperature: 0.4,
                max_tokens: 4000,
            },
            image: ImageSettings {
                model: "image-model".to_string(),
                api_key: Some("secret-key".to_string()),
                base_url: base_url.to_string(),
                binding: "openai".to_string(),
                aspect_ratio: "16:9".to_string(),
            },
        }
    }

    fn app_with(dir: &tempfile::TempDir, settings: DeckSettings) -> Router {
        let mut config = AppConfig::default();
        config.server.data_dir = dir.path().to_path_buf();
        let state = AppState::new(&config, settings).unwrap();
        build_router(state, &config.server)
    }

    fn app(dir: &tempfile::TempDir) -> Router {
        app_with(dir, deck_settings(true, "http://127.0.0.1:9"))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, name: &str) -> Notebook {
        let (status, body) = send(app, "POST", "/api/v1/notebook/create", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(body["notebook"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, "GET", "/api/v1/notebook/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "notebook");
    }

    #[tokio::test]
    async fn test_create_uses_defaults_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let notebook = create(&app, "Physics").await;
        assert_eq!(notebook.color, "#3B82F6");
        assert_eq!(notebook.icon, "book");
        assert_eq!(notebook.id.as_str().len(), 8);

        let (status, body) = send(&app, "GET", "/api/v1/notebook/list", None).await;
        assert_eq!(status, StatusCode::OK);
        let list: NotebookListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.notebooks[0].name, "Physics");
    }

    #[tokio::test]
    async fn test_create_validation_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, "POST", "/api/v1/notebook/create", Some(json!({ "name": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("ノートブック名"));

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/notebook/create",
            Some(json!({ "name": "A", "color": "blue" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partial_update_and_missing_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let notebook = create(&app, "Before").await;

        let uri = format!("/api/v1/notebook/{}", notebook.id);
        let (status, body) = send(&app, "PUT", &uri, Some(json!({ "name": "After" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notebook"]["name"], "After");
        assert_eq!(body["notebook"]["color"], "#3B82F6");

        let (status, _) = send(&app, "PUT", "/api/v1/notebook/ffffffff", Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/api/v1/notebook/ffffffff", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_records_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let first = create(&app, "One").await;
        let second = create(&app, "Two").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/notebook/add_record",
            Some(json!({
                "notebook_ids": [first.id, second.id, "missing1"],
                "record_type": "solve",
                "title": "Integral",
                "user_query": "integrate x",
                "output": "x^2/2",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added_to_notebooks"].as_array().unwrap().len(), 2);

        let uri = format!("/api/v1/notebook/{}/records", first.id);
        let (status, body) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "type": "note", "title": "Memo", "output": "text" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["user_query"], "Memo");
        let record_id = body["record"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, "GET", &format!("/api/v1/notebook/{}", first.id), None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 2);

        let (_, stats) = send(&app, "GET", "/api/v1/notebook/statistics", None).await;
        assert_eq!(stats["total_notebooks"], 2);
        assert_eq!(stats["total_records"], 3);
        assert_eq!(stats["records_by_type"]["solve"], 2);
        assert_eq!(stats["records_by_type"]["note"], 1);

        let remove = format!("/api/v1/notebook/{}/records/{}", first.id, record_id);
        let (status, _) = send(&app, "DELETE", &remove, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &remove, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let notebook = create(&app, "Gone").await;

        let uri = format!("/api/v1/notebook/{}", notebook.id);
        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&app, "GET", "/api/v1/notebook/list", None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_generate_title() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/notebook/generate_title",
            Some(json!({ "content": "\n  Meeting notes\nsecond line" })),
        )
        .await;
        assert_eq!(body["title"], "Meeting notes");

        let (_, body) = send(&app, "POST", "/api/v1/notebook/generate_title", Some(json!({}))).await;
        assert_eq!(body["title"], "New Note");
    }

    #[tokio::test]
    async fn test_config_and_templates() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, "GET", "/api/v1/research/ppt_config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true);
        assert_eq!(body["max_slides"], 4);
        assert_eq!(body["image"]["binding"], "openai");
        assert!(!body.to_string().contains("secret-key"));

        let (_, body) = send(&app, "GET", "/api/v1/research/ppt_style_templates", None).await;
        assert_eq!(body["templates"][0]["name"], "Minimal");
    }

    #[tokio::test]
    async fn test_deck_endpoints_forbidden_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(&dir, deck_settings(false, "http://127.0.0.1:9"));

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/research/ppt_outline",
            Some(json!({ "source_content": "notes" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "POST", "/api/v1/research/ppt_image", Some(json!({ "prompt": "x" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_outline_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let outline = json!({
            "title": "Waves",
            "slides": [
                { "title": "Intro", "points": ["a", " "], "layout": "TYPOGRAPHIC", "imagePrompt": "sea" },
                "not a slide",
            ],
        });
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({ "choices": [{ "message": { "content": outline.to_string() } }] }).to_string())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = app_with(&dir, deck_settings(true, &server.url()));

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/research/ppt_outline",
            Some(json!({ "source_content": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/research/ppt_outline",
            Some(json!({ "source_content": "Notes about waves" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let deck: Deck = serde_json::from_value(body).unwrap();
        assert_eq!(deck.title, "Waves");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].points, vec!["a".to_string()]);
        assert_eq!(deck.slides[0].layout.as_tag(), "TYPOGRAPHIC_WITH_IMAGE");
    }

    #[tokio::test]
    async fn test_image_endpoint_never_errors_on_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/images/generations")
            .with_status(503)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = app_with(&dir, deck_settings(true, &server.url()));

        let (status, body) = send(&app, "POST", "/api/v1/research/ppt_image", Some(json!({ "prompt": "sky" }))).await;
        assert_eq!(status, StatusCode::OK);
        let image: ImageResponse = serde_json::from_value(body).unwrap();
        assert!(image.image_data_url.is_empty());
        assert!(!image.cached);
    }
}
