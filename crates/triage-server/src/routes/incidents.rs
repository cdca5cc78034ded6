use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use triage_core::CoreError;
use triage_schema::{
    AnalyzeRequest, AnalyzeResponse, ChatMessageView, ChatRequest, ChatResponse, IncidentView,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/tasks", get(list_tasks))
        .route("/analyze", post(analyze))
        .route(
            "/incidencias/{id}/chat",
            post(chat_incident).get(list_incident_chat),
        )
}

fn core_error_status(err: CoreError) -> StatusCode {
    match err {
        CoreError::IncidentNotFound(id) => {
            tracing::debug!("incident {id} not found");
            StatusCode::NOT_FOUND
        }
        CoreError::Provider(err) => {
            tracing::error!("provider failure: {err:#}");
            StatusCode::BAD_GATEWAY
        }
        CoreError::Store(err) => {
            tracing::error!("storage failure: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "incident analysis API backed by an LLM"
    }))
}

async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<IncidentView>>, StatusCode> {
    let incidents = state.store.list_incidents().await.map_err(|err| {
        tracing::error!("storage failure: {err:#}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(incidents.into_iter().map(Into::into).collect()))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    if body.request_text.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let resp = state
        .analyzer
        .analyze(&body.request_text)
        .await
        .map_err(core_error_status)?;
    Ok(Json(resp))
}

async fn chat_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if body.user_message.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let response = state
        .chat
        .chat(id, &body.messages, &body.user_message)
        .await
        .map_err(core_error_status)?;
    Ok(Json(ChatResponse { response }))
}

async fn list_incident_chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ChatMessageView>>, StatusCode> {
    let messages = state.chat.list_chat(id).await.map_err(core_error_status)?;
    Ok(Json(messages))
}
