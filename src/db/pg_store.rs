use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::{
    db::store::{ChatStore, ConfidenceStore, CourseStore, UserStore},
    error::{AppError, AppResult},
    models::{
        AiRecommendation, ArchivedConversation, CandidateRow, ConfidenceEntry, Conversation,
        CourseListing, NewUser, PopularCourse, SubjectConfidence, User, UserCredentials,
        UserSummary,
    },
};

/// PostgreSQL-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Row types. Roles are stored as text and parsed on the way out.

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(FromRow)]
struct UserSummaryRow {
    id: i64,
    name: String,
    email: String,
    role: String,
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = AppError;

    fn try_from(row: UserSummaryRow) -> Result<Self, Self::Error> {
        Ok(UserSummary {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
        })
    }
}

#[derive(FromRow)]
struct CandidateDbRow {
    id: i64,
    name: String,
    email: String,
    role: String,
    subject: String,
    confidence: i32,
}

impl TryFrom<CandidateDbRow> for CandidateRow {
    type Error = AppError;

    fn try_from(row: CandidateDbRow) -> Result<Self, Self::Error> {
        Ok(CandidateRow {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            subject: row.subject,
            confidence: row.confidence,
        })
    }
}

#[derive(FromRow)]
struct SubjectRow {
    subject: String,
    confidence: i32,
}

#[derive(FromRow)]
struct ConfidenceEntryRow {
    subject: String,
    confidence: i32,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PopularCourseRow {
    course_id: i64,
    title: String,
    description: Option<String>,
    enrollment_count: i64,
}

#[derive(FromRow)]
struct CourseListingRow {
    id: i64,
    title: String,
    description: Option<String>,
    category: Option<String>,
    difficulty_level: String,
    enrollment_count: i64,
    enrolled_by_me: bool,
}

#[derive(FromRow)]
struct ConversationRow {
    id: i64,
    message: String,
    response: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ArchivedRow {
    id: i64,
    message: String,
    response: String,
    original_timestamp: Option<DateTime<Utc>>,
    archived_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, name, email, role, is_active, created_at";

const ARCHIVE_CONVERSATIONS_SQL: &str = r#"
    WITH moved AS (
        DELETE FROM chatbot_conversations
        WHERE user_id = $1
        RETURNING user_id, message, response, context_data, created_at
    )
    INSERT INTO chatbot_conversations_archive
        (user_id, message, response, context_data, original_timestamp)
    SELECT user_id, message, response, context_data, created_at
    FROM moved
"#;

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(UserCredentials {
                user: User::try_from(r.user)?,
                password_hash: r.password_hash,
            })
        })
        .transpose()
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn record_login(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn active_users_except(&self, user_id: i64, limit: i64) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE id <> $1 AND is_active = TRUE
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserSummary::try_from).collect()
    }
}

#[async_trait]
impl ConfidenceStore for PgStore {
    async fn upsert_confidence(
        &self,
        user_id: i64,
        subject: &str,
        confidence: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subject_confidence (user_id, subject, confidence)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, subject)
            DO UPDATE SET confidence = EXCLUDED.confidence, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(subject)
        .bind(confidence)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn subjects_for_user(&self, user_id: i64) -> AppResult<Vec<SubjectConfidence>> {
        let rows = sqlx::query_as::<_, SubjectRow>(
            "SELECT subject, confidence FROM subject_confidence WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SubjectConfidence {
                subject: r.subject,
                confidence: r.confidence,
            })
            .collect())
    }

    async fn confidence_entries(&self, user_id: i64) -> AppResult<Vec<ConfidenceEntry>> {
        let rows = sqlx::query_as::<_, ConfidenceEntryRow>(
            r#"
            SELECT subject, confidence, updated_at
            FROM subject_confidence
            WHERE user_id = $1
            ORDER BY subject
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ConfidenceEntry {
                subject: r.subject,
                confidence: r.confidence,
                updated_at: r.updated_at,
            })
            .collect())
    }

    async fn candidate_rows(
        &self,
        user_id: i64,
        subjects: &[String],
        limit: i64,
    ) -> AppResult<Vec<CandidateRow>> {
        let rows = sqlx::query_as::<_, CandidateDbRow>(
            r#"
            SELECT u.id, u.name, u.email, u.role, sc.subject, sc.confidence
            FROM users u
            JOIN subject_confidence sc ON sc.user_id = u.id
            WHERE u.id <> $1 AND u.is_active = TRUE AND sc.subject = ANY($2)
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(subjects)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CandidateRow::try_from).collect()
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn popular_courses(&self, limit: i64) -> AppResult<Vec<PopularCourse>> {
        let rows = sqlx::query_as::<_, PopularCourseRow>(
            r#"
            SELECT c.id AS course_id, c.title, c.description,
                   COUNT(ce.id) AS enrollment_count
            FROM courses c
            LEFT JOIN course_enrollments ce ON ce.course_id = c.id
            WHERE c.is_published = TRUE
            GROUP BY c.id
            ORDER BY enrollment_count DESC, c.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PopularCourse {
                course_id: r.course_id,
                title: r.title,
                description: r.description,
                enrollment_count: r.enrollment_count,
            })
            .collect())
    }

    async fn published_courses(&self, user_id: i64) -> AppResult<Vec<CourseListing>> {
        let rows = sqlx::query_as::<_, CourseListingRow>(
            r#"
            SELECT c.id, c.title, c.description, c.category, c.difficulty_level,
                   COUNT(ce.id) AS enrollment_count,
                   COALESCE(BOOL_OR(ce.user_id = $1), FALSE) AS enrolled_by_me
            FROM courses c
            LEFT JOIN course_enrollments ce ON ce.course_id = c.id
            WHERE c.is_published = TRUE
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CourseListing {
                id: r.id,
                title: r.title,
                description: r.description,
                category: r.category,
                difficulty_level: r.difficulty_level,
                enrollment_count: r.enrollment_count,
                enrolled_by_me: r.enrolled_by_me,
            })
            .collect())
    }

    async fn course_exists(&self, course_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1 AND is_published = TRUE)",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn enroll(&self, user_id: i64, course_id: i64) -> AppResult<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO course_enrollments (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn log_recommendations(
        &self,
        user_id: i64,
        recommendations: &[AiRecommendation],
    ) -> AppResult<()> {
        for rec in recommendations {
            sqlx::query(
                r#"
                INSERT INTO ai_recommendations
                    (user_id, recommended_course_id, recommendation_reason, confidence_score)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(rec.course_id)
            .bind(&rec.reason)
            .bind(rec.confidence)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn save_conversation(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        context: &Value,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chatbot_conversations (user_id, message, response, context_data)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(context)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_conversations(
        &self,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, message, response, created_at
            FROM chatbot_conversations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Conversation {
                id: r.id,
                message: r.message,
                response: r.response,
                timestamp: r.created_at,
            })
            .collect())
    }

    async fn archive_conversations(&self, user_id: i64) -> AppResult<u64> {
        // One statement, so only the rows actually deleted get archived
        let archived = sqlx::query(ARCHIVE_CONVERSATIONS_SQL)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(archived)
    }

    async fn recent_archived(
        &self,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<ArchivedConversation>> {
        let rows = sqlx::query_as::<_, ArchivedRow>(
            r#"
            SELECT id, message, response, original_timestamp, archived_at
            FROM chatbot_conversations_archive
            WHERE user_id = $1
            ORDER BY archived_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ArchivedConversation {
                id: r.id,
                message: r.message,
                response: r.response,
                original_timestamp: r.original_timestamp,
                archived_at: r.archived_at,
            })
            .collect())
    }
}
