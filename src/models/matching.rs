use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, UserSummary};

/// One of the requester's own (subject, confidence) rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfidence {
    pub subject: String,
    pub confidence: i32,
}

/// A subject confidence row as listed on the profile page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEntry {
    pub subject: String,
    pub confidence: i32,
    pub updated_at: DateTime<Utc>,
}

/// A (user, subject, confidence) row from the candidate pool
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub subject: String,
    pub confidence: i32,
}

/// A scored candidate, merged across every shared subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub subjects: BTreeMap<String, i32>,
    pub score: u32,
}

/// Either a ranked list or, when the requester has no subjects, an unscored one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PeerMatches {
    Ranked(Vec<RankedMatch>),
    Unscored(Vec<UserSummary>),
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: PeerMatches,
}

/// Body of `POST /api/profile/confidence`
///
/// `confidence` is kept wide so out-of-range values reach validation
/// instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct UpsertConfidenceRequest {
    pub subject: String,
    pub confidence: i64,
}
