// Outline parsing and normalization
//
// Turns a free-form model reply into a well-formed Deck capped at the
// effective slide limit.

use serde_json::Value;

use crate::layout::SlideLayout;
use crate::models::{Deck, Slide};

/// Source content sent upstream is cut at this many characters
pub const MAX_SOURCE_CHARS: usize = 16_000;

pub const DEFAULT_DECK_TITLE: &str = "Presentation";
pub const DEFAULT_THEME_COLOR: &str = "#3b82f6";
pub const DEFAULT_ACCENT_COLOR: &str = "#f59e0b";

/// Outline errors
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("アウトラインのJSONを解析できませんでした")]
    Unparsable,
}

/// Trim whitespace and cut at `MAX_SOURCE_CHARS` characters
pub fn trim_source(source: &str) -> &str {
    let cleaned = source.trim();
    match cleaned.char_indices().nth(MAX_SOURCE_CHARS) {
        Some((byte_index, _)) => &cleaned[..byte_index],
        None => cleaned,
    }
}

/// Slide limit for one request: the requested value, or the configured cap,
/// never below 1 and never above the cap.
pub fn effective_max_slides(requested: Option<u32>, cap: u32) -> usize {
    let cap = cap.max(1);
    requested.unwrap_or(cap).clamp(1, cap) as usize
}

/// Find the JSON object in a model reply.
///
/// Tries the whole text, then a ```json fenced block, then the outermost
/// `{ ... }` span.
pub fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(value) = parse_object(text) {
        return Some(value);
    }

    if let Some(fenced) = fenced_json_block(text) {
        if let Some(value) = parse_object(fenced) {
            return Some(value);
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        return parse_object(&text[start..=end]);
    }
    None
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn fenced_json_block(text: &str) -> Option<&str> {
    const FENCE: &str = "```json";
    let lower = text.to_ascii_lowercase();
    let open = lower.find(FENCE)?;
    let body_start = open + FENCE.len();
    let body_len = text[body_start..].find("```")?;
    Some(text[body_start..body_start + body_len].trim())
}

/// Normalize a color to lowercase `#rrggbb`, or fall back
pub fn normalize_hex(value: Option<&Value>, fallback: &str) -> String {
    match value.and_then(scalar_text) {
        Some(text) => normalize_color(&text, fallback),
        None => fallback.to_string(),
    }
}

/// Same as `normalize_hex` for a plain string
pub fn normalize_color(text: &str, fallback: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return fallback.to_string();
    }
    let candidate = if text.starts_with('#') {
        text.to_string()
    } else {
        format!("#{}", text)
    };
    if crate::validation::is_hex_color(&candidate) {
        candidate.to_ascii_lowercase()
    } else {
        fallback.to_string()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(scalar_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn normalize_slide(raw: &serde_json::Map<String, Value>) -> Slide {
    let title = text_or(raw.get("title"), "Slide");

    let points = raw
        .get("points")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(scalar_text)
                .filter(|p| !p.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    let layout = raw
        .get("layout")
        .and_then(Value::as_str)
        .map(SlideLayout::from_tag)
        .unwrap_or_default();

    let image_prompt = raw
        .get("imagePrompt")
        .and_then(scalar_text)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    // A text-only slide that came with a prompt gets the image variant
    let layout = match (layout, &image_prompt) {
        (SlideLayout::Typographic, Some(_)) => SlideLayout::TypographicWithImage,
        (layout, _) => layout,
    };

    Slide {
        title,
        points,
        layout,
        image_prompt,
        generated_image_url: None,
    }
}

/// Build a Deck from parsed outline JSON, keeping at most `max_slides` slides
pub fn normalize_outline(outline: &Value, max_slides: usize) -> Deck {
    let max_slides = max_slides.max(1);

    let slides: Vec<Slide> = outline
        .get("slides")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(normalize_slide)
                .take(max_slides)
                .collect()
        })
        .unwrap_or_default();

    let slides = if slides.is_empty() {
        vec![Slide::new("Overview", Vec::new(), SlideLayout::Typographic)]
    } else {
        slides
    };

    Deck {
        title: text_or(outline.get("title"), DEFAULT_DECK_TITLE),
        subtitle: text_or(outline.get("subtitle"), ""),
        theme_color: normalize_hex(outline.get("themeColor"), DEFAULT_THEME_COLOR),
        accent_color: normalize_hex(outline.get("accentColor"), DEFAULT_ACCENT_COLOR),
        slides,
    }
}

/// Parse and normalize a raw model reply
pub fn parse_outline(reply: &str, max_slides: usize) -> Result<Deck, OutlineError> {
    let value = extract_json(reply).ok_or(OutlineError::Unparsable)?;
    Ok(normalize_outline(&value, max_slides))
}
