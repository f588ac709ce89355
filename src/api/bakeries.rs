//! Bakery and baked good endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{is_truthy, non_empty, parse_json_body, parse_record_id, ApiError, AppState};
use crate::types::{BakedGood, Bakery, RecordId};

/// List every bakery
pub async fn list_bakeries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Bakery>>, ApiError> {
    let bakeries = state.store.list_bakeries().await?;
    Ok(Json(bakeries))
}

/// Rename a bakery.
///
/// A missing or empty `name` is not an error: the bakery is returned as is.
/// The id is looked up before the body is read.
pub async fn update_bakery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Bakery>, ApiError> {
    let id = parse_record_id(&id)?;
    state.store.get_bakery(id).await?;

    let payload: UpdateBakeryRequest = parse_json_body(&body)?;
    let name = non_empty(payload.name.as_deref());

    let bakery = state.store.update_bakery_name(id, name).await?;
    if name.is_some() {
        tracing::info!(id, name = %bakery.name, "Renamed bakery");
    }

    Ok(Json(bakery))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBakeryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Bakeries are never deleted. The id is still looked up first so that a
/// missing bakery answers 404 like every other record type.
pub async fn delete_bakery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_record_id(&id)?;
    state.store.get_bakery(id).await?;

    Err(ApiError::method_not_allowed("Bakeries cannot be deleted"))
}

/// List every baked good
pub async fn list_baked_goods(
    State(state): State<AppState>,
) -> Result<Json<Vec<BakedGood>>, ApiError> {
    let baked_goods = state.store.list_baked_goods().await?;
    Ok(Json(baked_goods))
}

/// Create a baked good for an existing bakery
pub async fn create_baked_good(
    State(state): State<AppState>,
    Json(payload): Json<CreateBakedGoodRequest>,
) -> Result<(StatusCode, Json<BakedGood>), ApiError> {
    let (Some(name), Some(bakery_id)) = (
        payload.name.filter(is_truthy),
        payload.bakery_id.filter(is_truthy),
    ) else {
        return Err(ApiError::bad_request("Name and bakery_id are required"));
    };

    let Value::String(name) = name else {
        return Err(ApiError::bad_request("name must be a string"));
    };
    let bakery_id = bakery_id_from(&bakery_id)
        .ok_or_else(|| ApiError::bad_request("bakery_id must be an integer"))?;

    let baked_good = state.store.create_baked_good(&name, bakery_id).await?;
    tracing::info!(
        id = baked_good.id,
        bakery_id = baked_good.bakery_id,
        name = %baked_good.name,
        "Created baked good"
    );

    Ok((StatusCode::CREATED, Json(baked_good)))
}

/// Fields stay untyped so that falsy values of any JSON type are reported
/// as missing rather than as a type error.
#[derive(Debug, Deserialize)]
pub struct CreateBakedGoodRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub bakery_id: Option<Value>,
}

/// Accept integers and integer strings, as a form-style client may send either
fn bakery_id_from(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Delete a baked good, answering 200 with a confirmation message
pub async fn delete_baked_good(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteBakedGoodResponse>, ApiError> {
    let id = parse_record_id(&id)?;

    state.store.delete_baked_good(id).await?;
    tracing::info!(id, "Deleted baked good");

    Ok(Json(DeleteBakedGoodResponse {
        message: format!("Baked good {} successfully deleted.", id),
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteBakedGoodResponse {
    pub message: String,
}
