use serde::{Deserialize, Serialize};

/// A published course with its enrollment count, as ranked by popularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularCourse {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub enrollment_count: i64,
}

/// A single course recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub reason: String,
    pub confidence: f64,
}

/// Where a recommendation list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Fallback,
}

/// Response body for a locally computed recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
}

/// The subset of an AI recommendation that gets logged
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiRecommendation {
    pub course_id: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub confidence: f64,
}

/// A published course as listed for students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseListing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty_level: String,
    pub enrollment_count: i64,
    pub enrolled_by_me: bool,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub message: String,
    pub enrollment_id: i64,
}
