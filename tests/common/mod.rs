#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use edu_match_api::{
    auth::{issue_token, password::hash_password},
    config::Config,
    db::{ChatStore, ConfidenceStore, CourseStore, UserStore},
    error::AppResult,
    models::{
        AiRecommendation, ArchivedConversation, CandidateRow, ChatbotForward, ConfidenceEntry,
        Conversation, CourseListing, NewUser, PopularCourse, Role, SubjectConfidence, User,
        UserCredentials, UserSummary,
    },
    routes::{create_router, AppState},
    services::ai::{AiClient, AiError},
};

pub const JWT_SECRET: &str = "integration-secret";

#[derive(Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Clone)]
struct StoredConfidence {
    user_id: i64,
    subject: String,
    confidence: i32,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
struct StoredCourse {
    id: i64,
    title: String,
    published: bool,
}

#[derive(Clone)]
struct StoredConversation {
    id: i64,
    user_id: i64,
    message: String,
    response: String,
    context: Value,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<StoredUser>,
    confidence: Vec<StoredConfidence>,
    courses: Vec<StoredCourse>,
    enrollments: Vec<(i64, i64, i64)>,
    recommendation_log: Vec<(i64, AiRecommendation)>,
    conversations: Vec<StoredConversation>,
    archive: Vec<(i64, ArchivedConversation)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn enrollment_count(&self, course_id: i64) -> i64 {
        self.enrollments
            .iter()
            .filter(|(_, _, c)| *c == course_id)
            .count() as i64
    }

    fn user(&self, user_id: i64) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.user.id == user_id)
    }
}

/// In-memory stand-in for the Postgres store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub async fn seed_user(&self, name: &str, role: Role) -> User {
        self.seed_user_with(name, role, true, "unused-hash").await
    }

    pub async fn seed_user_with(
        &self,
        name: &str,
        role: Role,
        is_active: bool,
        password_hash: &str,
    ) -> User {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let user = User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            role,
            is_active,
            created_at: Utc::now(),
        };
        tables.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        user
    }

    pub async fn seed_confidence(&self, user_id: i64, subject: &str, confidence: i32) {
        self.upsert_confidence(user_id, subject, confidence)
            .await
            .unwrap();
    }

    /// Adds a published course with `enrollments` enrollments by throwaway users
    pub async fn seed_course(&self, title: &str, enrollments: usize) -> i64 {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.courses.push(StoredCourse {
            id,
            title: title.to_string(),
            published: true,
        });
        for _ in 0..enrollments {
            let enrollment_id = tables.next_id();
            tables.enrollments.push((enrollment_id, -1, id));
        }
        id
    }

    pub async fn logged_recommendations(&self, user_id: i64) -> Vec<AiRecommendation> {
        let tables = self.tables.read().await;
        tables
            .recommendation_log
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, rec)| rec.clone())
            .collect()
    }

    pub async fn conversation_contexts(&self, user_id: i64) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.context.clone())
            .collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.user.email == new_user.email) {
            return Ok(None);
        }

        let id = tables.next_id();
        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.push(StoredUser {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(Some(user))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| UserCredentials {
                user: u.user.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.user(user_id).map(|u| u.user.clone()))
    }

    async fn record_login(&self, _user_id: i64) -> AppResult<()> {
        Ok(())
    }

    async fn active_users_except(&self, user_id: i64, limit: i64) -> AppResult<Vec<UserSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.user.id != user_id && u.user.is_active)
            .take(limit as usize)
            .map(|u| UserSummary::from(&u.user))
            .collect())
    }
}

#[async_trait]
impl ConfidenceStore for MemoryStore {
    async fn upsert_confidence(&self, user_id: i64, subject: &str, confidence: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match tables
            .confidence
            .iter_mut()
            .find(|c| c.user_id == user_id && c.subject == subject)
        {
            Some(existing) => {
                existing.confidence = confidence;
                existing.updated_at = now;
            }
            None => tables.confidence.push(StoredConfidence {
                user_id,
                subject: subject.to_string(),
                confidence,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn subjects_for_user(&self, user_id: i64) -> AppResult<Vec<SubjectConfidence>> {
        let tables = self.tables.read().await;
        Ok(tables
            .confidence
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| SubjectConfidence {
                subject: c.subject.clone(),
                confidence: c.confidence,
            })
            .collect())
    }

    async fn confidence_entries(&self, user_id: i64) -> AppResult<Vec<ConfidenceEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<ConfidenceEntry> = tables
            .confidence
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| ConfidenceEntry {
                subject: c.subject.clone(),
                confidence: c.confidence,
                updated_at: c.updated_at,
            })
            .collect();
        entries.sort_by(|a, b| a.subject.cmp(&b.subject));
        Ok(entries)
    }

    async fn candidate_rows(
        &self,
        user_id: i64,
        subjects: &[String],
        limit: i64,
    ) -> AppResult<Vec<CandidateRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .confidence
            .iter()
            .filter(|c| c.user_id != user_id && subjects.contains(&c.subject))
            .filter_map(|c| {
                let stored = tables.user(c.user_id)?;
                stored.user.is_active.then(|| CandidateRow {
                    id: stored.user.id,
                    name: stored.user.name.clone(),
                    email: stored.user.email.clone(),
                    role: stored.user.role,
                    subject: c.subject.clone(),
                    confidence: c.confidence,
                })
            })
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn popular_courses(&self, limit: i64) -> AppResult<Vec<PopularCourse>> {
        let tables = self.tables.read().await;
        let mut courses: Vec<PopularCourse> = tables
            .courses
            .iter()
            .filter(|c| c.published)
            .map(|c| PopularCourse {
                course_id: c.id,
                title: c.title.clone(),
                description: None,
                enrollment_count: tables.enrollment_count(c.id),
            })
            .collect();
        courses.sort_by(|a, b| b.enrollment_count.cmp(&a.enrollment_count));
        courses.truncate(limit as usize);
        Ok(courses)
    }

    async fn published_courses(&self, user_id: i64) -> AppResult<Vec<CourseListing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .iter()
            .filter(|c| c.published)
            .map(|c| CourseListing {
                id: c.id,
                title: c.title.clone(),
                description: None,
                category: None,
                difficulty_level: "beginner".to_string(),
                enrollment_count: tables.enrollment_count(c.id),
                enrolled_by_me: tables
                    .enrollments
                    .iter()
                    .any(|(_, u, course)| *u == user_id && *course == c.id),
            })
            .collect())
    }

    async fn course_exists(&self, course_id: i64) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().any(|c| c.id == course_id && c.published))
    }

    async fn enroll(&self, user_id: i64, course_id: i64) -> AppResult<Option<i64>> {
        let mut tables = self.tables.write().await;
        if tables
            .enrollments
            .iter()
            .any(|(_, u, c)| *u == user_id && *c == course_id)
        {
            return Ok(None);
        }
        let id = tables.next_id();
        tables.enrollments.push((id, user_id, course_id));
        Ok(Some(id))
    }

    async fn log_recommendations(
        &self,
        user_id: i64,
        recommendations: &[AiRecommendation],
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .recommendation_log
            .extend(recommendations.iter().cloned().map(|r| (user_id, r)));
        Ok(())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn save_conversation(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        context: &Value,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        // Strictly increasing timestamps keep ordering deterministic
        let created_at = Utc::now() + chrono::Duration::milliseconds(id);
        tables.conversations.push(StoredConversation {
            id,
            user_id,
            message: message.to_string(),
            response: response.to_string(),
            context: context.clone(),
            created_at,
        });
        Ok(())
    }

    async fn recent_conversations(&self, user_id: i64, limit: i64) -> AppResult<Vec<Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .conversations
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .take(limit as usize)
            .map(|c| Conversation {
                id: c.id,
                message: c.message.clone(),
                response: c.response.clone(),
                timestamp: c.created_at,
            })
            .collect())
    }

    async fn archive_conversations(&self, user_id: i64) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.conversations)
            .into_iter()
            .partition(|c| c.user_id == user_id);
        tables.conversations = kept;

        let count = moved.len() as u64;
        for c in moved {
            let id = tables.next_id();
            tables.archive.push((
                user_id,
                ArchivedConversation {
                    id,
                    message: c.message,
                    response: c.response,
                    original_timestamp: Some(c.created_at),
                    archived_at: Utc::now(),
                },
            ));
        }
        Ok(count)
    }

    async fn recent_archived(
        &self,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<ArchivedConversation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .archive
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .take(limit as usize)
            .map(|(_, a)| a.clone())
            .collect())
    }
}

/// How the fake AI service answers
#[derive(Clone)]
pub enum AiBehavior {
    Respond(Value),
    Unavailable,
    Status(u16),
}

pub struct FakeAi {
    behavior: AiBehavior,
}

impl FakeAi {
    pub fn new(behavior: AiBehavior) -> Self {
        Self { behavior }
    }

    fn answer(&self) -> Result<Value, AiError> {
        match &self.behavior {
            AiBehavior::Respond(value) => Ok(value.clone()),
            AiBehavior::Unavailable => Err(AiError::Unavailable("operation timed out".to_string())),
            AiBehavior::Status(status) => Err(AiError::Status {
                status: *status,
                body: "upstream failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl AiClient for FakeAi {
    async fn recommendations(&self, _user_id: i64, _timeout: Duration) -> Result<Value, AiError> {
        self.answer()
    }

    async fn chatbot(&self, _request: ChatbotForward) -> Result<Value, AiError> {
        self.answer()
    }

    async fn learning_path(&self, _user_id: i64) -> Result<Value, AiError> {
        self.answer()
    }

    async fn full_recommendations(&self, _user_id: i64) -> Result<Value, AiError> {
        self.answer()
    }

    async fn summarize(&self, text: String) -> Result<Value, AiError> {
        self.answer()
            .map(|_| json!({ "summary": text.split_whitespace().take(3).collect::<Vec<_>>().join(" ") }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new(behavior: AiBehavior) -> Self {
        let config = Config::from_pairs(vec![(
            "JWT_SECRET".to_string(),
            JWT_SECRET.to_string(),
        )])
        .unwrap();

        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(config, store.clone(), Arc::new(FakeAi::new(behavior)));
        let server = TestServer::new(create_router(state)).unwrap();

        Self { server, store }
    }

    /// Seeds a user and returns it with a valid session token
    pub async fn user(&self, name: &str, role: Role) -> (User, String) {
        let user = self.store.seed_user(name, role).await;
        let token = issue_token(&user, JWT_SECRET, 1).unwrap();
        (user, token)
    }

    pub async fn user_with_password(&self, name: &str, password: &str, is_active: bool) -> User {
        let hash = hash_password(password).unwrap();
        self.store
            .seed_user_with(name, Role::Student, is_active, &hash)
            .await
    }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
