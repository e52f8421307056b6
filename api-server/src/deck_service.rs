// Deck generation: outlines, cached slide images and the public config view

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use notebook_deck_core::{
    effective_max_slides, parse_outline, trim_source, validate_source_content, Deck,
    DeckConfigResponse, ImageResponse, ImageTunables, OutlineRequest, OutlineTunables,
};
use notebook_deck_generation_client::{outline_prompts, ImageClient, OutlineClient};
use notebook_deck_storageservice::{cache_key, ImageCache};

use crate::config::DeckSettings;
use crate::errors::{ApiResult, ApiServerError};

type KeyLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// One request's share of a per-key lock. Dropping it, including when the
/// request future is cancelled, removes the map entry once nobody else
/// holds the lock.
struct InFlight {
    locks: KeyLocks,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl InFlight {
    fn join(locks: &KeyLocks, key: &str) -> Self {
        let lock = locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        Self {
            locks: locks.clone(),
            key: key.to_string(),
            lock,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // map + ours
        if Arc::strong_count(&self.lock) <= 2 {
            locks.remove(&self.key);
        }
    }
}

pub struct DeckService {
    settings: DeckSettings,
    outline_client: OutlineClient,
    image_client: ImageClient,
    cache: ImageCache,
    in_flight: KeyLocks,
}

impl DeckService {
    pub fn new(settings: DeckSettings, cache: ImageCache) -> ApiResult<Self> {
        let outline_client = OutlineClient::new(settings.outline.clone())?;
        let image_client = ImageClient::new(settings.image.clone())?;
        Ok(Self {
            settings,
            outline_client,
            image_client,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn settings(&self) -> &DeckSettings {
        &self.settings
    }

    fn ensure_enabled(&self) -> ApiResult<()> {
        if self.settings.enabled {
            Ok(())
        } else {
            Err(ApiServerError::FeatureDisabled)
        }
    }

    pub fn config(&self) -> DeckConfigResponse {
        DeckConfigResponse {
            enabled: self.settings.enabled,
            max_slides: self.settings.max_slides,
            style_templates: self.settings.style_templates.clone(),
            outline: OutlineTunables {
                temperature: self.settings.outline.temperature,
                max_tokens: self.settings.outline.max_tokens,
            },
            image: ImageTunables {
                model: self.settings.image.model.clone(),
                binding: self.settings.image.binding.clone(),
                aspect_ratio: self.settings.image.aspect_ratio.clone(),
            },
        }
    }

    /// Ask the chat model for an outline and normalize it into a deck
    pub async fn outline(&self, request: &OutlineRequest) -> ApiResult<Deck> {
        self.ensure_enabled()?;
        validate_source_content(&request.source_content)?;

        let outline_settings = self.outline_client.settings();
        if outline_settings.model.trim().is_empty() {
            return Err(ApiServerError::NotConfigured("outline.model"));
        }

        let source = trim_source(&request.source_content);
        let max_slides = effective_max_slides(request.max_slides, self.settings.max_slides);
        let style = request
            .style_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.settings.default_style_prompt.as_deref());

        tracing::info!(
            "Generating outline: source_chars={}, max_slides={}, model={}",
            source.chars().count(),
            max_slides,
            outline_settings.model
        );

        let (system_prompt, user_prompt) = outline_prompts(source, style, max_slides);
        let reply = self.outline_client.complete(&system_prompt, &user_prompt).await?;

        let deck = parse_outline(&reply, max_slides).map_err(|e| {
            let preview: String = reply.chars().take(300).collect();
            tracing::warn!("Outline reply could not be parsed: {}", preview);
            ApiServerError::from(e)
        })?;

        tracing::info!("Outline ready: {} slides", deck.slides.len());
        Ok(deck)
    }

    /// Image for one slide prompt. Never fails: problems give an empty URL.
    pub async fn image(&self, prompt: &str) -> ApiResult<ImageResponse> {
        self.ensure_enabled()?;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            tracing::debug!("Empty image prompt, nothing to generate");
            return Ok(ImageResponse::default());
        }

        let image = self.image_client.settings();
        if image.model.trim().is_empty() || image.base_url.trim().is_empty() {
            tracing::warn!("Image generation is not configured (model/base_url missing)");
            return Ok(ImageResponse::default());
        }

        let key = cache_key(&image.model, &image.aspect_ratio, prompt);
        if let Some(data_url) = self.cache.read(&key) {
            tracing::debug!("Image cache hit: {}", key);
            return Ok(ImageResponse {
                image_data_url: data_url,
                cached: true,
            });
        }

        let entry = InFlight::join(&self.in_flight, &key);
        let _guard = entry.lock.lock().await;

        // Another request may have produced it while we waited
        let response = if let Some(data_url) = self.cache.read(&key) {
            tracing::debug!("Image cache hit after wait: {}", key);
            ImageResponse {
                image_data_url: data_url,
                cached: true,
            }
        } else {
            match self.image_client.generate(prompt).await {
                Ok(data_url) => {
                    self.cache.write(&key, &data_url);
                    ImageResponse {
                        image_data_url: data_url,
                        cached: false,
                    }
                }
                Err(e) => {
                    tracing::warn!("Image generation failed for {}: {}", key, e);
                    ImageResponse::default()
                }
            }
        };

        Ok(response)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_deck_core::{encode_data_url, SlideLayout};
    use notebook_deck_generation_client::{ChatSettings, ImageSettings};

    use crate::config::DeckSettings;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn settings(base_url: &str) -> DeckSettings {
        DeckSettings {
            enabled: true,
            max_slides: 5,
            style_templates: Vec::new(),
            default_style_prompt: None,
            outline: ChatSettings {
                model: "chat-model".to_string(),
                api_key: Some("k".to_string()),
                base_url: base_url.to_string(),
                binding: "openai".to_string(),
                temperature: 0.4,
                max_tokens: 4000,
            },
            image: ImageSettings {
                model: "image-model".to_string(),
                api_key: Some("k".to_string()),
                base_url: base_url.to_string(),
                binding: "gemini".to_string(),
                aspect_ratio: "16:9".to_string(),
            },
        }
    }

    fn service(settings: DeckSettings, dir: &tempfile::TempDir) -> DeckService {
        DeckService::new(settings, ImageCache::new(dir.path().join("ppt_images"))).unwrap()
    }

    fn gemini_body() -> String {
        let data_url = encode_data_url("image/png", &PNG);
        let data = data_url.trim_start_matches("data:image/png;base64,");
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": data } }] } }]
        })
        .to_string()
    }

    fn request(source: &str, max_slides: Option<u32>) -> OutlineRequest {
        OutlineRequest {
            source_content: source.to_string(),
            style_prompt: None,
            max_slides,
        }
    }

    #[tokio::test]
    async fn test_outline_is_normalized_and_capped() {
        let mut server = mockito::Server::new_async().await;
        let slides: Vec<_> = (0..8)
            .map(|i| serde_json::json!({ "title": format!("S{}", i), "points": ["a"], "layout": "QUOTE" }))
            .collect();
        let outline = serde_json::json!({ "title": "Deck", "themeColor": "1E40AF", "slides": slides });
        let reply = serde_json::json!({
            "choices": [{ "message": { "content": format!("```json\n{}\n```", outline) } }]
        });
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply.to_string())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings(&server.url()), &dir);
        let deck = svc.outline(&request("notes", Some(50))).await.unwrap();

        mock.assert_async().await;
        assert_eq!(deck.slides.len(), 5);
        assert_eq!(deck.theme_color, "#1e40af");
        assert_eq!(deck.slides[0].layout, SlideLayout::Quote);
    }

    #[tokio::test]
    async fn test_outline_rejects_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings("http://127.0.0.1:9"), &dir);
        let err = svc.outline(&request("   ", None)).await.unwrap_err();
        assert!(matches!(err, ApiServerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_disabled_feature_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let mut disabled = settings("http://127.0.0.1:9");
        disabled.enabled = false;
        let svc = service(disabled, &dir);
        assert!(matches!(
            svc.outline(&request("notes", None)).await,
            Err(ApiServerError::FeatureDisabled)
        ));
        assert!(matches!(svc.image("forest").await, Err(ApiServerError::FeatureDisabled)));
    }

    #[tokio::test]
    async fn test_outline_without_model_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut unconfigured = settings("http://127.0.0.1:9");
        unconfigured.outline.model = String::new();
        let svc = service(unconfigured, &dir);
        assert!(matches!(
            svc.outline(&request("notes", None)).await,
            Err(ApiServerError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_unparsable_outline_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"sorry, no JSON today"}}]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings(&server.url()), &dir);
        let err = svc.outline(&request("notes", None)).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_image_generated_once_then_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(r"^/models/image-model:generateContent".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(gemini_body())
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings(&server.url()), &dir);

        let first = svc.image("calm lake").await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.image_data_url, encode_data_url("image/png", &PNG));

        let second = svc.image("  calm lake ").await.unwrap();
        assert!(second.cached);
        assert_eq!(second.image_data_url, first.image_data_url);

        mock.assert_async().await;
        assert_eq!(svc.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_identical_prompts_call_upstream_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Regex(r"^/models/image-model:generateContent".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(gemini_body())
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(service(settings(&server.url()), &dir));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.image("mountain dawn").await })
            })
            .collect();

        let mut cached = 0;
        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert!(!response.image_data_url.is_empty());
            if response.cached {
                cached += 1;
            }
        }

        assert_eq!(cached, 3);
        mock.assert_async().await;
        let files = std::fs::read_dir(dir.path().join("ppt_images")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_image_failures_yield_empty_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Regex(r"^/models/image-model:generateContent".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings(&server.url()), &dir);

        let response = svc.image("storm").await.unwrap();
        assert!(response.image_data_url.is_empty());
        assert!(svc.image("   ").await.unwrap().image_data_url.is_empty());

        let mut unconfigured = settings(&server.url());
        unconfigured.image.model = String::new();
        let svc = service(unconfigured, &dir);
        assert!(svc.image("storm").await.unwrap().image_data_url.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_image_request_releases_key() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings(&base_url), &dir);

        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(200), svc.image("slow dusk")).await;
        assert!(outcome.is_err());
        assert_eq!(svc.in_flight_len(), 0);
        drop(listener);
    }

    #[test]
    fn test_in_flight_entry_outlives_other_holders() {
        let locks: KeyLocks = Arc::new(Mutex::new(HashMap::new()));
        let first = InFlight::join(&locks, "k");
        let second = InFlight::join(&locks, "k");
        assert!(Arc::ptr_eq(&first.lock, &second.lock));

        drop(first);
        assert_eq!(locks.lock().unwrap().len(), 1);
        drop(second);
        assert!(locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_config_has_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(settings("https://secret.example.com"), &dir);
        let json = serde_json::to_string(&svc.config()).unwrap();
        assert!(!json.contains("secret.example.com"));
        assert!(json.contains("\"aspect_ratio\":\"16:9\""));
    }
}
