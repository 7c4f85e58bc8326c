use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{
        ArchiveListing, ArchiveResult, ChatRequest, HistoryQuery, HistoryResponse, Role,
        SummarizeRequest,
    },
    services::{
        ai::{AiClient, AiError},
        chatbot::{self, ChatOutcome},
        recommendations::{recommend_courses, FallbackPolicy, RecommendationOutcome},
    },
};

use super::{
    extract::{ApiJson, ApiQuery},
    AppState,
};

/// Logs an AI proxy failure and hides its details behind `message`
fn proxy_error(what: &'static str, message: &'static str) -> impl FnOnce(AiError) -> AppError {
    move |e| {
        tracing::error!(error = %e, what, "AI proxy request failed");
        AppError::ExternalApi(message.to_string())
    }
}

/// Recommendations for `user_id`; students may only ask about themselves
pub async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<RecommendationOutcome>> {
    if auth.role == Role::Student && auth.id != user_id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let policy = FallbackPolicy::ai_route(state.config.ai_fallback_confidence);
    let outcome = recommend_courses(
        &*state.ai,
        &*state.store,
        user_id,
        state.config.ai_recommendation_timeout(),
        &policy,
    )
    .await?;

    Ok(Json(outcome))
}

pub async fn chatbot(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<ChatRequest>,
) -> AppResult<Json<ChatOutcome>> {
    let outcome = chatbot::chat(&*state.ai, &*state.store, auth.id, request).await?;
    Ok(Json(outcome))
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let conversations = chatbot::history(&*state.store, auth.id, query.limit).await?;
    Ok(Json(HistoryResponse { conversations }))
}

pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ArchiveResult>> {
    let archived = chatbot::archive(&*state.store, auth.id).await?;
    Ok(Json(ArchiveResult { archived }))
}

pub async fn archived(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> AppResult<Json<ArchiveListing>> {
    let archived = chatbot::archived(&*state.store, auth.id, query.limit).await?;
    Ok(Json(ArchiveListing { archived }))
}

pub async fn learning_path(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let path = state
        .ai
        .learning_path(auth.id)
        .await
        .map_err(proxy_error("learning_path", "Failed to get learning path"))?;
    Ok(Json(path))
}

pub async fn full_recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Value>> {
    let bundle = state
        .ai
        .full_recommendations(auth.id)
        .await
        .map_err(proxy_error(
            "full_recommendations",
            "Failed to get full recommendations",
        ))?;
    Ok(Json(bundle))
}

pub async fn summarize(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(request): ApiJson<SummarizeRequest>,
) -> AppResult<Json<Value>> {
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("text is required".to_string()))?;

    let summary = state
        .ai
        .summarize(text)
        .await
        .map_err(proxy_error("summarize", "Failed to summarize content"))?;
    Ok(Json(summary))
}
