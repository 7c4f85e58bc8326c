use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    auth::AuthUser,
    db::ConfidenceStore,
    error::AppResult,
    models::UpsertConfidenceRequest,
    services::{accounts, profile},
};

use super::{extract::ApiJson, AppState};

/// Account plus every recorded subject confidence
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let user = accounts::current_user(&*state.store, auth.id).await?;
    let subject_confidence = state.store.confidence_entries(auth.id).await?;

    Ok(Json(json!({
        "user": user,
        "subject_confidence": subject_confidence,
    })))
}

pub async fn save_confidence(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<UpsertConfidenceRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    profile::record_confidence(&*state.store, auth.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Confidence saved" })),
    ))
}
