// Deck outline generation over an OpenAI-compatible chat completions API

use std::time::Duration;

use serde_json::{json, Value};

use crate::errors::ClientError;
use crate::image::send_json;

const CHAT_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolved chat model settings for outline generation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub binding: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// (system prompt, user prompt) asking for a JSON deck outline
pub fn outline_prompts(source: &str, style_prompt: Option<&str>, max_slides: usize) -> (String, String) {
    let system = "You are a world-class presentation designer and consultant. \
         Return ONLY valid JSON with keys: title, subtitle, themeColor, accentColor, slides. \
         slides must be an array of objects with keys: title, points, layout, imagePrompt. \
         Do not include markdown or commentary."
        .to_string();

    let mut user = format!(
        "Create a high-end, professional presentation from the content below.\n\n\
         Constraints:\n\
         - Maximum slides: {max_slides}\n\
         - Generate 7-9 slides for comprehensive coverage\n\
         - Keep bullets concise (<= 12 words each)\n\
         - Provide themeColor (primary hex) and accentColor (secondary hex) that complement each other\n\n\
         Use a VARIETY of creative slide layouts (do not repeat the same layout consecutively):\n\
         - SECTION_HEADER: Impactful full-screen transition slide with bold title\n\
         - OVERVIEW: Grid-based agenda or summary slide with 4 boxes\n\
         - SPLIT_IMAGE_LEFT: Full-height image on left, text on right\n\
         - SPLIT_IMAGE_RIGHT: Full-height image on right, text on left\n\
         - TOP_IMAGE: Wide banner image at top, text below\n\
         - TYPOGRAPHIC_WITH_IMAGE: Design-focused typography with a framed image element\n\
         - QUOTE: Large centered impactful quote with decorative marks\n\
         - TYPOGRAPHIC: Text-only with vertical accent bar (no image)\n\n\
         CRITICAL rules for 'imagePrompt' (follow strictly):\n\
         - DO NOT request data charts, graphs, bar charts, pie charts, heat maps, or data visualizations\n\
         - DO NOT request flowcharts, timelines, org charts, or diagrams with text labels\n\
         - DO NOT include brand logos, company names, or specific product names\n\
         - ONLY describe abstract visual metaphors, scenic illustrations, or conceptual imagery\n\
         - The AI generates pure visual illustrations WITHOUT any text, numbers, or labels\n"
    );
    if let Some(style) = style_prompt.map(str::trim).filter(|s| !s.is_empty()) {
        user.push_str(&format!("- Style guidance: {}\n", style));
    }
    user.push_str(&format!("\nContent:\n{}", source));

    (system, user)
}

/// Chat completions client
pub struct OutlineClient {
    client: reqwest::Client,
    settings: ChatSettings,
}

impl OutlineClient {
    pub fn new(settings: ChatSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .no_proxy()
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Send one system + user exchange and return the assistant text
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ClientError> {
        if self.settings.model.trim().is_empty() {
            return Err(ClientError::NotConfigured("outline.model"));
        }
        if self.settings.base_url.trim().is_empty() {
            return Err(ClientError::NotConfigured("outline.base_url"));
        }

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = self.settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        tracing::debug!("Requesting outline from {} ({})", self.settings.model, self.settings.binding);
        let body = send_json(request).await?;
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidResponse("choices[0].message.content not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_limits_and_style() {
        let (system, user) = outline_prompts("Notes body", Some("  minimal  "), 6);
        assert!(system.contains("Return ONLY valid JSON"));
        assert!(user.contains("- Maximum slides: 6"));
        assert!(user.contains("- Style guidance: minimal\n"));
        assert!(user.ends_with("Content:\nNotes body"));
    }

    #[test]
    fn test_blank_style_is_omitted() {
        let (_, user) = outline_prompts("x", Some("   "), 3);
        assert!(!user.contains("Style guidance"));
    }
}
