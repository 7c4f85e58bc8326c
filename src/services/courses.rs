use serde_json::Value;

use crate::{
    db::CourseStore,
    error::{AppError, AppResult},
    models::EnrollResponse,
    services::recommendations::extract_ai_recommendations,
};

/// Enrolls a student in a published course
pub async fn enroll<C: CourseStore + ?Sized>(
    courses: &C,
    user_id: i64,
    course_id: i64,
) -> AppResult<EnrollResponse> {
    if !courses.course_exists(course_id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let enrollment_id = courses
        .enroll(user_id, course_id)
        .await?
        .ok_or_else(|| AppError::InvalidInput("Already enrolled in this course".to_string()))?;

    tracing::info!(user_id, course_id, enrollment_id, "Student enrolled");

    Ok(EnrollResponse {
        message: "Enrolled successfully".to_string(),
        enrollment_id,
    })
}

/// Records what the AI service recommended
///
/// A failed write is logged and swallowed; the recommendations are still served.
pub async fn log_ai_recommendations<C: CourseStore + ?Sized>(
    courses: &C,
    user_id: i64,
    payload: &Value,
) {
    let recommendations = extract_ai_recommendations(payload);
    if recommendations.is_empty() {
        return;
    }

    if let Err(e) = courses.log_recommendations(user_id, &recommendations).await {
        tracing::warn!(user_id, error = %e, "Failed to log AI recommendations");
    }
}
