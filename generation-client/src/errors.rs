// Client errors

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("ネットワークエラー: {0}")]
    Network(#[from] reqwest::Error),

    #[error("タイムアウト: 生成サーバーが応答しません")]
    Timeout,

    #[error("生成サーバーエラー: {status} {body}")]
    ServerError { status: u16, body: String },

    #[error("無効なレスポンス形式: {0}")]
    InvalidResponse(String),

    #[error("設定が不足しています: {0}")]
    NotConfigured(&'static str),

    #[error("未対応のバインディング: {0}")]
    UnsupportedBinding(String),
}

impl ClientError {
    /// Split reqwest failures into timeouts and everything else
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err)
        }
    }
}
