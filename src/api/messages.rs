//! Message endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::{non_empty, parse_json_body, parse_record_id, ApiError, AppState};
use crate::types::Message;

/// Create a message
pub async fn create_message(
    State(state): State<AppState>,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let (Some(body), Some(username)) = (
        non_empty(payload.body.as_deref()),
        non_empty(payload.username.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Body and username are required"));
    };

    let message = state.store.create_message(body, username).await?;
    tracing::info!(id = message.id, username = %message.username, "Created message");

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// List every message
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.store.list_messages().await?;
    Ok(Json(messages))
}

/// Update a message body.
///
/// `updated_at` is refreshed even when the payload carries no `body`.
/// The id is looked up before the body is read.
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Message>, ApiError> {
    let id = parse_record_id(&id)?;
    state.store.get_message(id).await?;

    let payload: UpdateMessageRequest = parse_json_body(&body)?;

    if payload.body.as_deref() == Some("") {
        return Err(ApiError::bad_request("Body must not be empty"));
    }

    let message = state
        .store
        .update_message_body(id, payload.body.as_deref())
        .await?;
    tracing::debug!(id, "Updated message");

    Ok(Json(message))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub body: Option<String>,
}

/// Delete a message, answering 204 with no body
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_record_id(&id)?;

    state.store.delete_message(id).await?;
    tracing::info!(id, "Deleted message");

    Ok(StatusCode::NO_CONTENT)
}
