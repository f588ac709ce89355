//! HTTP API server

use axum::{
    body::Bytes,
    routing::{delete, get, patch},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::storage::RecordStore;
use crate::types::RecordId;

pub mod bakeries;
pub mod error;
pub mod messages;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/messages/:id",
            patch(messages::update_message).delete(messages::delete_message),
        )
        .route("/bakeries", get(bakeries::list_bakeries))
        .route(
            "/bakeries/:id",
            patch(bakeries::update_bakery).delete(bakeries::delete_bakery),
        )
        .route(
            "/baked_goods",
            get(bakeries::list_baked_goods).post(bakeries::create_baked_good),
        )
        .route("/baked_goods/:id", delete(bakeries::delete_baked_good))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convenience helper wrapping a store into router state
pub fn create_store_router(store: Arc<dyn RecordStore>) -> Router {
    create_router(AppState::new(store))
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Parse a record id from a path segment.
///
/// Anything that is not an integer can never name a record, so it is
/// reported as a lookup miss rather than a bad request.
pub(crate) fn parse_record_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>().map_err(|_| ApiError::not_found())
}

/// Treat missing and empty strings alike, as the request contract does.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Truthiness of a JSON value: `null`, `false`, zero, empty strings and
/// empty containers are all falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Decode a request body read after the id lookup. An empty body decodes
/// as the default payload.
pub(crate) fn parse_json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("Invalid JSON body: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("12").unwrap(), 12);
        assert_eq!(
            parse_record_id("abc").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            parse_record_id("").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_is_truthy() {
        for falsy in [
            serde_json::json!(null),
            serde_json::json!(false),
            serde_json::json!(0),
            serde_json::json!(0.0),
            serde_json::json!(""),
            serde_json::json!([]),
            serde_json::json!({}),
        ] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [
            serde_json::json!(true),
            serde_json::json!(1),
            serde_json::json!("0"),
            serde_json::json!([0]),
        ] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }

    #[derive(Debug, Default, serde::Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Option<String>,
    }

    #[test]
    fn test_parse_json_body() {
        let empty: Payload = parse_json_body(&Bytes::new()).unwrap();
        assert!(empty.name.is_none());

        let named: Payload = parse_json_body(&Bytes::from_static(br#"{"name":"x"}"#)).unwrap();
        assert_eq!(named.name.as_deref(), Some("x"));

        let err = parse_json_body::<Payload>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("Your Bakery")), Some("Your Bakery"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
