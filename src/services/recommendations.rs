use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::{
    db::CourseStore,
    error::{AppError, AppResult},
    models::{
        AiRecommendation, PopularCourse, Recommendation, RecommendationResponse,
        RecommendationSource,
    },
    services::ai::AiClient,
};

/// Number of popular courses offered when the AI service is unreachable
pub const FALLBACK_LIMIT: usize = 5;

/// Fixed reason and confidence stamped onto every fallback recommendation
///
/// The two call sites use different constants; neither carries statistical
/// meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    pub reason: String,
    pub confidence: f64,
}

impl FallbackPolicy {
    /// Policy for `/api/ai/recommendations/{user_id}`
    pub fn ai_route(confidence: f64) -> Self {
        Self {
            reason: "Popular course recommendation".to_string(),
            confidence,
        }
    }

    /// Policy for `/api/students/recommendations`
    pub fn student_route(confidence: f64) -> Self {
        Self {
            reason: "Popular course".to_string(),
            confidence,
        }
    }
}

/// Recommendations as served to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationOutcome {
    /// Passed through from the AI service
    Primary(Value),
    Fallback(RecommendationResponse),
}

/// Ranks courses by enrollment count and wraps the top ones as recommendations
///
/// Ties keep input order.
pub fn popular_course_fallback(
    mut courses: Vec<PopularCourse>,
    policy: &FallbackPolicy,
) -> RecommendationResponse {
    courses.sort_by(|a, b| b.enrollment_count.cmp(&a.enrollment_count));
    courses.truncate(FALLBACK_LIMIT);

    let recommendations = courses
        .into_iter()
        .map(|course| Recommendation {
            course_id: course.course_id,
            title: course.title,
            description: course.description,
            reason: policy.reason.clone(),
            confidence: policy.confidence,
        })
        .collect();

    RecommendationResponse {
        recommendations,
        source: RecommendationSource::Fallback,
    }
}

/// Asks the AI service for recommendations, falling back to popular courses
/// when it times out or refuses the connection
///
/// Any other AI failure is returned as an error; so is a failure of the
/// popularity query.
pub async fn recommend_courses<C>(
    ai: &dyn AiClient,
    courses: &C,
    user_id: i64,
    timeout: Duration,
    policy: &FallbackPolicy,
) -> AppResult<RecommendationOutcome>
where
    C: CourseStore + ?Sized,
{
    match ai.recommendations(user_id, timeout).await {
        Ok(value) => Ok(RecommendationOutcome::Primary(value)),
        Err(e) if e.is_unavailable() => {
            tracing::warn!(
                user_id,
                error = %e,
                provider = ai.name(),
                "AI service unavailable, using popular-course fallback"
            );

            let popular = courses.popular_courses(FALLBACK_LIMIT as i64).await?;
            Ok(RecommendationOutcome::Fallback(popular_course_fallback(
                popular, policy,
            )))
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "AI recommendations failed");
            Err(AppError::ExternalApi(
                "Failed to get recommendations".to_string(),
            ))
        }
    }
}

/// Extracts the loggable part of an AI recommendation payload
///
/// Entries that do not parse are skipped.
pub fn extract_ai_recommendations(payload: &Value) -> Vec<AiRecommendation> {
    payload
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
