// Message mapping for result codes

use notebook_deck_core::{ErrorCode, ProcessResult, StatusLevel};

/// Message level for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl From<StatusLevel> for MessageLevel {
    fn from(level: StatusLevel) -> Self {
        match level {
            StatusLevel::Info => MessageLevel::Info,
            StatusLevel::Warning => MessageLevel::Warning,
            StatusLevel::Error => MessageLevel::Error,
        }
    }
}

fn context_value(result: &ProcessResult, key: &str) -> Option<String> {
    let value = result.context.as_ref()?.get(key)?;
    Some(match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    })
}

/// Get user-friendly message from ProcessResult
pub fn get_message_from_result(result: &ProcessResult) -> String {
    match &result.code {
        ErrorCode::ValidationTextLimit => match context_value(result, "maxLength") {
            Some(max) => format!("入力内容が長すぎます。{}文字以内にしてください", max),
            None => result.code.to_message().to_string(),
        },
        ErrorCode::ValidationColor => match context_value(result, "color") {
            Some(color) => format!("無効なカラーコードです ({})。#RRGGBB形式で入力してください", color),
            None => result.code.to_message().to_string(),
        },
        ErrorCode::ImageGenerationFailed => match context_value(result, "slide") {
            Some(slide) => format!("スライド{}の画像を生成できませんでした。プレースホルダーのまま出力できます", slide),
            None => result.code.to_message().to_string(),
        },
        ErrorCode::OutlineError | ErrorCode::ExportError => match context_value(result, "reason") {
            Some(reason) => format!("{} ({})", result.code.to_message(), reason),
            None => result.code.to_message().to_string(),
        },
        code => code.to_message().to_string(),
    }
}

/// Get CSS class for message level
pub fn get_message_class(level: MessageLevel) -> &'static str {
    match level {
        MessageLevel::Info => "message-text",
        MessageLevel::Warning => "message-text warning",
        MessageLevel::Error => "message-text error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_codes_use_default_text() {
        let result = ProcessResult::success(ErrorCode::NotebookCreated);
        assert_eq!(get_message_from_result(&result), "ノートブックを作成しました");
    }

    #[test]
    fn test_context_is_woven_into_message() {
        let result = ProcessResult::error(ErrorCode::ImageGenerationFailed).with_context(json!({ "slide": 3 }));
        assert!(get_message_from_result(&result).starts_with("スライド3の画像"));

        let result = ProcessResult::error(ErrorCode::ValidationTextLimit)
            .with_context(json!({ "actual": 120, "maxLength": 100 }));
        assert!(get_message_from_result(&result).contains("100文字以内"));

        let result = ProcessResult::error(ErrorCode::OutlineError).with_context(json!({ "reason": "HTTPエラー: 502" }));
        assert!(get_message_from_result(&result).ends_with("(HTTPエラー: 502)"));
    }

    #[test]
    fn test_message_class_follows_level() {
        let level: MessageLevel = ErrorCode::ValidationEmpty.level().into();
        assert_eq!(get_message_class(level), "message-text warning");
        assert_eq!(get_message_class(MessageLevel::Error), "message-text error");
    }
}
