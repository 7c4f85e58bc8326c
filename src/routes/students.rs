use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    auth::AuthUser,
    db::CourseStore,
    error::AppResult,
    models::{EnrollRequest, EnrollResponse, Role},
    services::{
        courses,
        recommendations::{recommend_courses, FallbackPolicy, RecommendationOutcome},
    },
};

use super::{extract::ApiJson, AppState};

/// Published courses with enrollment counts
pub async fn courses(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    auth.require_role(&[Role::Student])?;

    let courses = state.store.published_courses(auth.id).await?;
    Ok(Json(json!({ "courses": courses })))
}

pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<EnrollRequest>,
) -> AppResult<(StatusCode, Json<EnrollResponse>)> {
    auth.require_role(&[Role::Student])?;

    let response = courses::enroll(&*state.store, auth.id, request.course_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// AI recommendations for the calling student, logged when the AI answers
pub async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<RecommendationOutcome>> {
    auth.require_role(&[Role::Student])?;

    let policy = FallbackPolicy::student_route(state.config.student_fallback_confidence);
    let outcome = recommend_courses(
        &*state.ai,
        &*state.store,
        auth.id,
        state.config.student_recommendation_timeout(),
        &policy,
    )
    .await?;

    if let RecommendationOutcome::Primary(ref payload) = outcome {
        courses::log_ai_recommendations(&*state.store, auth.id, payload).await;
    }

    Ok(Json(outcome))
}
