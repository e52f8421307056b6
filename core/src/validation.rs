// Validation logic for notebook forms and outline requests

use crate::models::ErrorCode;

/// Maximum notebook name length (characters)
pub const MAX_NAME_CHARS: usize = 100;

/// Maximum notebook description length (characters)
pub const MAX_DESCRIPTION_CHARS: usize = 2_000;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("ノートブック名が空です")]
    EmptyName,

    #[error("{field}が長すぎます: {actual}文字 (上限: {max}文字)")]
    TooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("無効なカラーコードです: {0}")]
    InvalidColor(String),

    #[error("元になるコンテンツが空です")]
    EmptySource,
}

impl ValidationError {
    /// Convert to ErrorCode
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyName | ValidationError::EmptySource => ErrorCode::ValidationEmpty,
            ValidationError::TooLong { .. } => ErrorCode::ValidationTextLimit,
            ValidationError::InvalidColor(_) => ErrorCode::ValidationColor,
        }
    }

    /// Get context for error (e.g., max length)
    pub fn context(&self) -> Option<serde_json::Value> {
        match self {
            ValidationError::TooLong { actual, max, .. } => Some(serde_json::json!({
                "actual": actual,
                "maxLength": max
            })),
            ValidationError::InvalidColor(color) => Some(serde_json::json!({ "color": color })),
            _ => None,
        }
    }
}

/// Name must be non-blank and at most `MAX_NAME_CHARS` characters
pub fn validate_notebook_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ValidationError::TooLong {
            field: "ノートブック名",
            actual: chars,
            max: MAX_NAME_CHARS,
        });
    }

    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let chars = description.chars().count();
    if chars > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::TooLong {
            field: "説明",
            actual: chars,
            max: MAX_DESCRIPTION_CHARS,
        });
    }
    Ok(())
}

/// Color must be `#RRGGBB`
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if is_hex_color(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn validate_source_content(source: &str) -> Result<(), ValidationError> {
    if source.trim().is_empty() {
        return Err(ValidationError::EmptySource);
    }
    Ok(())
}
