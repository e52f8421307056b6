// API handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notebook_deck_core::{
    suggest_note_title, AddRecordRequest, AddRecordResponse, CreateNotebookRequest,
    GenerateTitleRequest, GenerateTitleResponse, ImageRequest, NotebookId, NotebookListResponse,
    NotebookMutationResponse, NotebookRecord, OutlineRequest, SingleRecordRequest,
    SingleRecordResponse, StyleTemplatesResponse, SuccessResponse, UpdateNotebookRequest,
};
use serde_json::json;

use crate::errors::{ApiResult, ApiServerError};
use crate::state::AppState;

const NOTEBOOK: &str = "ノートブック";
const RECORD: &str = "レコード";

/// GET /api/v1/health - Health check endpoint
pub async fn health() -> Response {
    let health_status = json!({
        "status": "healthy",
        "service": "notebook-deck-api",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(health_status)).into_response()
}

/// GET /api/v1/notebook/health
pub async fn notebook_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "healthy", "service": "notebook" }))).into_response()
}

/// GET /api/v1/notebook/list
pub async fn list_notebooks(State(state): State<AppState>) -> ApiResult<Json<NotebookListResponse>> {
    let notebooks = state.notebooks.list_notebooks()?;
    Ok(Json(NotebookListResponse {
        total: notebooks.len(),
        notebooks,
    }))
}

/// POST /api/v1/notebook/create
pub async fn create_notebook(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotebookRequest>,
) -> ApiResult<Json<NotebookMutationResponse>> {
    payload.validate()?;

    let notebook = state.notebooks.create_notebook(payload)?;
    tracing::info!("Notebook created: {} ({})", notebook.name, notebook.id);
    Ok(Json(NotebookMutationResponse {
        success: true,
        notebook: Some(notebook),
    }))
}

/// GET /api/v1/notebook/{id}
pub async fn get_notebook(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let notebook = state
        .notebooks
        .get_notebook(&NotebookId(id))?
        .ok_or(ApiServerError::NotFound(NOTEBOOK))?;
    Ok((StatusCode::OK, Json(notebook)).into_response())
}

/// PUT /api/v1/notebook/{id}
pub async fn update_notebook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateNotebookRequest>,
) -> ApiResult<Json<NotebookMutationResponse>> {
    payload.validate()?;

    let notebook = state
        .notebooks
        .update_notebook(&NotebookId(id), payload)?
        .ok_or(ApiServerError::NotFound(NOTEBOOK))?;
    tracing::info!("Notebook updated: {}", notebook.id);
    Ok(Json(NotebookMutationResponse {
        success: true,
        notebook: Some(notebook),
    }))
}

/// DELETE /api/v1/notebook/{id}
pub async fn delete_notebook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = NotebookId(id);
    if !state.notebooks.delete_notebook(&id)? {
        return Err(ApiServerError::NotFound(NOTEBOOK));
    }
    tracing::info!("Notebook deleted: {}", id);
    Ok(Json(SuccessResponse {
        success: true,
        message: "ノートブックを削除しました".to_string(),
    }))
}

/// POST /api/v1/notebook/add_record - Add one record to several notebooks
pub async fn add_record(
    State(state): State<AppState>,
    Json(payload): Json<AddRecordRequest>,
) -> ApiResult<Json<AddRecordResponse>> {
    let record = NotebookRecord::new(
        payload.record_type,
        payload.title,
        payload.user_query,
        payload.output,
        payload.metadata,
        payload.kb_name,
    );

    let added = state.notebooks.add_record(&payload.notebook_ids, &record)?;
    if added.len() < payload.notebook_ids.len() {
        tracing::warn!(
            "Record {} skipped {} unknown notebook(s)",
            record.id,
            payload.notebook_ids.len() - added.len()
        );
    }

    Ok(Json(AddRecordResponse {
        success: true,
        record,
        added_to_notebooks: added,
    }))
}

/// POST /api/v1/notebook/{id}/records
pub async fn add_record_to_notebook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SingleRecordRequest>,
) -> ApiResult<Json<SingleRecordResponse>> {
    let user_query = if payload.user_query.trim().is_empty() {
        payload.title.clone()
    } else {
        payload.user_query
    };
    let record = NotebookRecord::new(
        payload.record_type,
        payload.title,
        user_query,
        payload.output,
        payload.metadata,
        payload.kb_name,
    );

    let id = NotebookId(id);
    if state.notebooks.add_record(std::slice::from_ref(&id), &record)?.is_empty() {
        return Err(ApiServerError::NotFound(NOTEBOOK));
    }

    Ok(Json(SingleRecordResponse {
        success: true,
        record,
    }))
}

/// DELETE /api/v1/notebook/{id}/records/{record_id}
pub async fn remove_record(
    State(state): State<AppState>,
    Path((id, record_id)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    if !state.notebooks.remove_record(&NotebookId(id), &record_id)? {
        return Err(ApiServerError::NotFound(RECORD));
    }
    Ok(Json(SuccessResponse {
        success: true,
        message: "レコードを削除しました".to_string(),
    }))
}

/// GET /api/v1/notebook/statistics
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = state.notebooks.statistics()?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}

/// POST /api/v1/notebook/generate_title
pub async fn generate_title(Json(payload): Json<GenerateTitleRequest>) -> Json<GenerateTitleResponse> {
    Json(GenerateTitleResponse {
        title: suggest_note_title(&payload.content),
    })
}

/// POST /api/v1/research/ppt_outline
pub async fn ppt_outline(
    State(state): State<AppState>,
    Json(payload): Json<OutlineRequest>,
) -> ApiResult<Response> {
    let deck = state.deck.outline(&payload).await?;
    Ok((StatusCode::OK, Json(deck)).into_response())
}

/// POST /api/v1/research/ppt_image
pub async fn ppt_image(State(state): State<AppState>, Json(payload): Json<ImageRequest>) -> ApiResult<Response> {
    let image = state.deck.image(&payload.prompt).await?;
    Ok((StatusCode::OK, Json(image)).into_response())
}

/// GET /api/v1/research/ppt_config
pub async fn ppt_config(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.deck.config())).into_response()
}

/// GET /api/v1/research/ppt_style_templates
pub async fn ppt_style_templates(State(state): State<AppState>) -> Json<StyleTemplatesResponse> {
    Json(StyleTemplatesResponse {
        templates: state.deck.settings().style_templates.clone(),
    })
}
