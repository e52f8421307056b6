// HTTP client for the notebook and slide export API

use crate::errors::ApiError;
use notebook_deck_core::{
    CreateNotebookRequest, Deck, DeckConfigResponse, ErrorCode, ErrorResponse, ImageRequest,
    ImageResponse, Notebook, NotebookId, NotebookListResponse, NotebookMutationResponse,
    NotebookSummary, OutlineRequest, SuccessResponse, UpdateNotebookRequest,
};
use serde::de::DeserializeOwned;
use std::env;

const NO_RESPONSE: &str =
    "サーバーが応答していません。時間をおいて再度接続を試すか管理者に問い合わせてください。";
const PARSE_FAILED: &str = "レスポンスの解析に失敗しました。";

fn get_api_base_url() -> String {
    env::var("API_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn notebook_url(id: &NotebookId) -> String {
    format!(
        "{}/api/v1/notebook/{}",
        get_api_base_url(),
        urlencoding::encode(id.as_str())
    )
}

/// Send and turn non-2xx statuses into ApiError
async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|_| ApiError::NetworkError(NO_RESPONSE.to_string()))?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let detail = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();

    match status {
        403 => ApiError::ProcessError(ErrorCode::FeatureDisabled),
        404 => ApiError::ProcessError(ErrorCode::NotFound),
        _ if detail.is_empty() => ApiError::ServerError(format!("HTTPエラー: {}", status)),
        _ => ApiError::ServerError(format!("HTTPエラー: {} {}", status, detail)),
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|_| ApiError::NetworkError(PARSE_FAILED.to_string()))
}

/// Create/update responses must carry `success` and the notebook
fn mutated_notebook(response: NotebookMutationResponse) -> Result<Notebook, ApiError> {
    match response {
        NotebookMutationResponse {
            success: true,
            notebook: Some(notebook),
        } => Ok(notebook),
        _ => Err(ApiError::ProcessError(ErrorCode::InvalidResponse)),
    }
}

/// Fetch all notebook summaries, most recently updated first
pub async fn list_notebooks() -> Result<Vec<NotebookSummary>, ApiError> {
    let client = reqwest::Client::new();
    let response = send(client.get(format!("{}/api/v1/notebook/list", get_api_base_url()))).await?;
    let list: NotebookListResponse = parse(response).await?;
    Ok(list.notebooks)
}

/// Fetch one notebook with its records
pub async fn get_notebook(id: &NotebookId) -> Result<Notebook, ApiError> {
    let client = reqwest::Client::new();
    let response = send(client.get(notebook_url(id))).await?;
    parse(response).await
}

pub async fn create_notebook(request: &CreateNotebookRequest) -> Result<Notebook, ApiError> {
    let client = reqwest::Client::new();
    let response = send(
        client
            .post(format!("{}/api/v1/notebook/create", get_api_base_url()))
            .json(request),
    )
    .await?;
    mutated_notebook(parse(response).await?)
}

pub async fn update_notebook(id: &NotebookId, request: &UpdateNotebookRequest) -> Result<Notebook, ApiError> {
    let client = reqwest::Client::new();
    let response = send(client.put(notebook_url(id)).json(request)).await?;
    mutated_notebook(parse(response).await?)
}

pub async fn delete_notebook(id: &NotebookId) -> Result<(), ApiError> {
    let client = reqwest::Client::new();
    let response = send(client.delete(notebook_url(id))).await?;
    let body: SuccessResponse = parse(response).await?;
    if body.success {
        Ok(())
    } else {
        Err(ApiError::ProcessError(ErrorCode::InvalidResponse))
    }
}

/// Public slide export settings (no secrets)
pub async fn fetch_ppt_config() -> Result<DeckConfigResponse, ApiError> {
    let client = reqwest::Client::new();
    let response = send(client.get(format!("{}/api/v1/research/ppt_config", get_api_base_url()))).await?;
    parse(response).await
}

/// Generate a normalized deck outline from notebook content
pub async fn request_outline(request: &OutlineRequest) -> Result<Deck, ApiError> {
    let client = reqwest::Client::new();
    let response = send(
        client
            .post(format!("{}/api/v1/research/ppt_outline", get_api_base_url()))
            .json(request),
    )
    .await?;
    parse(response).await
}

/// Generate (or fetch from cache) the image for one slide prompt.
///
/// An empty `image_data_url` is returned as `ImageGenerationFailed`.
pub async fn request_slide_image(prompt: &str) -> Result<ImageResponse, ApiError> {
    let client = reqwest::Client::new();
    let request = ImageRequest {
        prompt: prompt.to_string(),
    };
    let response = send(
        client
            .post(format!("{}/api/v1/research/ppt_image", get_api_base_url()))
            .json(&request),
    )
    .await?;

    let image: ImageResponse = parse(response).await?;
    if image.image_data_url.is_empty() {
        Err(ApiError::ProcessError(ErrorCode::ImageGenerationFailed))
    } else {
        Ok(image)
    }
}
