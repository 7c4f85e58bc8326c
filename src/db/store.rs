use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{
        AiRecommendation, ArchivedConversation, CandidateRow, ConfidenceEntry, Conversation,
        CourseListing, NewUser, PopularCourse, SubjectConfidence, User, UserCredentials,
        UserSummary,
    },
};

/// Account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account, returning `None` when the email is already registered
    async fn create_user(&self, new_user: NewUser) -> AppResult<Option<User>>;

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>>;

    async fn record_login(&self, user_id: i64) -> AppResult<()>;

    /// Up to `limit` active users other than `user_id`, in no particular order
    async fn active_users_except(&self, user_id: i64, limit: i64) -> AppResult<Vec<UserSummary>>;
}

/// Subject confidence persistence and the peer-matching candidate pool
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfidenceStore: Send + Sync {
    /// Inserts or overwrites the confidence for (user, subject)
    async fn upsert_confidence(&self, user_id: i64, subject: &str, confidence: i32)
        -> AppResult<()>;

    async fn subjects_for_user(&self, user_id: i64) -> AppResult<Vec<SubjectConfidence>>;

    /// Profile listing, ordered by subject
    async fn confidence_entries(&self, user_id: i64) -> AppResult<Vec<ConfidenceEntry>>;

    /// Rows of active users other than `user_id` holding one of `subjects`, capped at `limit`
    async fn candidate_rows(
        &self,
        user_id: i64,
        subjects: &[String],
        limit: i64,
    ) -> AppResult<Vec<CandidateRow>>;
}

/// Courses, enrollments and the recommendation log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Published courses ordered by enrollment count, descending
    async fn popular_courses(&self, limit: i64) -> AppResult<Vec<PopularCourse>>;

    async fn published_courses(&self, user_id: i64) -> AppResult<Vec<CourseListing>>;

    async fn course_exists(&self, course_id: i64) -> AppResult<bool>;

    /// Enrolls the user, returning `None` when already enrolled
    async fn enroll(&self, user_id: i64, course_id: i64) -> AppResult<Option<i64>>;

    async fn log_recommendations(
        &self,
        user_id: i64,
        recommendations: &[AiRecommendation],
    ) -> AppResult<()>;
}

/// Chatbot conversation persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn save_conversation(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        context: &Value,
    ) -> AppResult<()>;

    /// Most recent conversations first
    async fn recent_conversations(&self, user_id: i64, limit: i64)
        -> AppResult<Vec<Conversation>>;

    /// Moves every conversation of the user into the archive, returning the count moved
    async fn archive_conversations(&self, user_id: i64) -> AppResult<u64>;

    /// Most recently archived first
    async fn recent_archived(
        &self,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<ArchivedConversation>>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store: UserStore + ConfidenceStore + CourseStore + ChatStore {}

impl<T> Store for T where T: UserStore + ConfidenceStore + CourseStore + ChatStore {}
