// Web UI error types

/// Web UI specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum UiError {
    /// Browser API (window, document, blob URL) unavailable or failed
    BrowserError(String),
    /// PPTX assembly failed
    ExportError(String),
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::BrowserError(msg) => write!(f, "ブラウザエラー: {}", msg),
            UiError::ExportError(msg) => write!(f, "出力エラー: {}", msg),
        }
    }
}

impl std::error::Error for UiError {}
