// API client errors

use notebook_deck_core::{ErrorCode, ProcessResult};

/// API client error types
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Network communication error
    NetworkError(String),
    /// Server returned an error response
    ServerError(String),
    /// Processing error with code
    ProcessError(ErrorCode),
}

impl ApiError {
    /// ProcessResult for the UI message bar
    pub fn to_process_result(&self) -> ProcessResult {
        match self {
            ApiError::NetworkError(msg) => ProcessResult::error(ErrorCode::NetworkError)
                .with_context(serde_json::json!({ "reason": msg })),
            ApiError::ServerError(msg) => ProcessResult::error(ErrorCode::ServerError)
                .with_context(serde_json::json!({ "reason": msg })),
            ApiError::ProcessError(code) => ProcessResult::error(code.clone()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NetworkError(msg) => write!(f, "ネットワークエラー: {}", msg),
            ApiError::ServerError(msg) => write!(f, "サーバーエラー: {}", msg),
            ApiError::ProcessError(code) => write!(f, "処理エラー: {}", code.to_message()),
        }
    }
}

impl std::error::Error for ApiError {}
