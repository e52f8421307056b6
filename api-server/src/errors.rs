// Server errors and their HTTP mapping

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notebook_deck_core::{ErrorResponse, OutlineError, ValidationError};
use notebook_deck_generation_client::ClientError;
use notebook_deck_storageservice::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    #[error("入力内容が不正です: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}が見つかりません")]
    NotFound(&'static str),

    #[error("スライド出力機能が無効です")]
    FeatureDisabled,

    #[error("モデルが設定されていません: {0}")]
    NotConfigured(&'static str),

    #[error("ストレージエラー: {0}")]
    Storage(#[from] StorageError),

    #[error("アウトライン生成に失敗しました: {0}")]
    Outline(#[from] OutlineError),

    #[error("生成サーバーの呼び出しに失敗しました: {0}")]
    Upstream(#[from] ClientError),
}

impl ApiServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiServerError::Storage(StorageError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            ApiServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiServerError::FeatureDisabled => StatusCode::FORBIDDEN,
            ApiServerError::Outline(OutlineError::Unparsable) | ApiServerError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiServerError::NotConfigured(_) | ApiServerError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiServerError::Validation(e) => e.context().map(|c| c.to_string()),
            ApiServerError::Storage(e) => Some(e.to_string()),
            ApiServerError::Upstream(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{} ({})", self, status);
        } else {
            tracing::warn!("{} ({})", self, status);
        }

        let mut body = ErrorResponse::new(self.to_string());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiServerError::Validation(ValidationError::EmptyName).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiServerError::Storage(StorageError::InvalidId("..".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiServerError::FeatureDisabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiServerError::NotFound("ノートブック").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiServerError::Outline(OutlineError::Unparsable).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiServerError::Upstream(ClientError::Timeout).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiServerError::NotConfigured("outline.model").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_carry_context() {
        let err = ApiServerError::Validation(ValidationError::InvalidColor("blue".to_string()));
        assert!(err.details().unwrap().contains("blue"));
    }
}
