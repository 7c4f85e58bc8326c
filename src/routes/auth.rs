use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    auth::AuthUser,
    error::AppResult,
    models::{AuthResponse, LoginRequest, RegisterRequest},
    services::accounts,
};

use super::{extract::ApiJson, AppState};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = accounts::register(&*state.store, &state.config, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = accounts::login(&*state.store, &state.config, request).await?;
    Ok(Json(response))
}

/// The caller's own account
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let user = accounts::current_user(&*state.store, auth.id).await?;
    Ok(Json(json!({ "user": user })))
}
