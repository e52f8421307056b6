// Slide illustration generation (Gemini / OpenAI images)

use std::time::Duration;

use serde_json::{json, Value};

use crate::errors::ClientError;

const GEMINI_TIMEOUT: Duration = Duration::from_secs(120);
const OPENAI_TIMEOUT: Duration = Duration::from_secs(60);

/// Upstream image API flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBinding {
    Gemini,
    OpenAi,
}

impl ImageBinding {
    pub fn parse(binding: &str) -> Option<Self> {
        match binding.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(ImageBinding::Gemini),
            "openai" => Some(ImageBinding::OpenAi),
            _ => None,
        }
    }
}

/// Resolved image generation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub binding: String,
    pub aspect_ratio: String,
}

/// Wrap a slide prompt so the model draws an abstract, text-free illustration
pub fn illustration_prompt(prompt: &str) -> String {
    format!(
        "Create a professional, artistic illustration for a presentation slide. \
         The theme is: {}. \
         CRITICAL RULES: \
         1. Generate ONLY abstract visual metaphors, NOT literal data charts or graphs. \
         2. Do NOT include any text, words, letters, numbers, labels, or typography. \
         3. If the theme mentions charts/graphs/data, create abstract visual representations instead \
         (e.g., flowing gradients, geometric patterns, upward arrows for growth). \
         4. Use professional, modern design aesthetics with smooth gradients and clean shapes. \
         5. The image should be purely visual and artistic.",
        prompt
    )
}

/// Image generation client
pub struct ImageClient {
    client: reqwest::Client,
    settings: ImageSettings,
}

impl ImageClient {
    pub fn new(settings: ImageSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Generate one illustration and return it as a data URL
    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        if self.settings.model.trim().is_empty() {
            return Err(ClientError::NotConfigured("image.model"));
        }
        if self.settings.base_url.trim().is_empty() {
            return Err(ClientError::NotConfigured("image.base_url"));
        }

        match ImageBinding::parse(&self.settings.binding) {
            Some(ImageBinding::Gemini) => self.generate_gemini(prompt).await,
            Some(ImageBinding::OpenAi) => self.generate_openai(prompt).await,
            None => Err(ClientError::UnsupportedBinding(self.settings.binding.clone())),
        }
    }

    async fn generate_gemini(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": illustration_prompt(prompt) }] }],
        });

        let mut request = self.client.post(&url).timeout(GEMINI_TIMEOUT).json(&payload);
        if let Some(key) = self.settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.query(&[("key", key)]);
        }

        let body = send_json(request).await?;
        let (mime, data) = extract_inline_image(&body).ok_or_else(|| {
            let preview: String = body.to_string().chars().take(500).collect();
            tracing::warn!("Gemini image response missing inline data: {}", preview);
            ClientError::InvalidResponse("inline image data not found".to_string())
        })?;

        tracing::info!("Gemini image extracted: mime={}, data_length={}", mime, data.len());
        Ok(format!("data:{};base64,{}", mime, data))
    }

    async fn generate_openai(&self, prompt: &str) -> Result<String, ClientError> {
        let mut base = self.settings.base_url.trim_end_matches('/').to_string();
        if !base.ends_with("/v1") {
            base.push_str("/v1");
        }
        let url = format!("{}/images/generations", base);
        let size = if self.settings.aspect_ratio == "16:9" {
            "1792x1024"
        } else {
            "1024x1024"
        };
        let payload = json!({
            "model": self.settings.model,
            "prompt": prompt,
            "size": size,
            "response_format": "b64_json",
        });

        let request = self
            .client
            .post(&url)
            .timeout(OPENAI_TIMEOUT)
            .bearer_auth(self.settings.api_key.as_deref().unwrap_or_default())
            .json(&payload);

        let body = send_json(request).await?;
        let b64 = body
            .get("data")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| item.get("b64_json"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("b64_json not found".to_string()))?;

        Ok(format!("data:image/png;base64,{}", b64))
    }
}

pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
    let response = request.send().await.map_err(ClientError::from_send)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::ServerError {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// First inline image part: (mime, base64 payload)
fn extract_inline_image(body: &Value) -> Option<(String, String)> {
    let candidates = body.get("candidates")?.as_array()?;
    candidates
        .iter()
        .filter_map(|c| c.get("content")?.get("parts")?.as_array())
        .flatten()
        .find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            let data = inline.get("data")?.as_str().filter(|d| !d.is_empty())?;
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .unwrap_or("image/png");
            Some((mime.to_string(), data.to_string()))
        })
}
