use std::collections::{BTreeMap, HashMap};

use crate::{
    db::{ConfidenceStore, UserStore},
    error::AppResult,
    models::{CandidateRow, PeerMatches, RankedMatch, Role, SubjectConfidence},
};

/// Maximum number of matches returned to the requester
pub const MAX_MATCHES: usize = 10;

/// Maximum number of candidate rows pulled into one ranking
pub const CANDIDATE_POOL_LIMIT: i64 = 200;

/// Closeness of two confidence values for the same subject
///
/// Identical confidence scores 100; a gap of 100 or more scores 0.
pub fn affinity_score(mine: i32, theirs: i32) -> u32 {
    let diff = (i64::from(mine) - i64::from(theirs)).unsigned_abs();
    100u64.saturating_sub(diff) as u32
}

/// Per-candidate accumulator, alive for one ranking only
struct Accumulator {
    id: i64,
    name: String,
    email: String,
    role: Role,
    subjects: BTreeMap<String, i32>,
    score: u32,
}

impl From<Accumulator> for RankedMatch {
    fn from(acc: Accumulator) -> Self {
        RankedMatch {
            id: acc.id,
            name: acc.name,
            email: acc.email,
            role: acc.role,
            subjects: acc.subjects,
            score: acc.score,
        }
    }
}

/// Scores, merges and ranks the candidate pool against the requester's subjects
///
/// Candidates are merged by id with one cumulative score. Rows for subjects the
/// requester does not hold are ignored. Ties keep the order in which candidates
/// first appear in `candidates`.
pub fn rank_candidates(
    requester: &[SubjectConfidence],
    candidates: Vec<CandidateRow>,
    limit: usize,
) -> Vec<RankedMatch> {
    let mine: HashMap<&str, i32> = requester
        .iter()
        .map(|s| (s.subject.as_str(), s.confidence))
        .collect();

    let mut accumulators: Vec<Accumulator> = Vec::new();
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for row in candidates {
        let Some(&my_confidence) = mine.get(row.subject.as_str()) else {
            tracing::debug!(
                candidate_id = row.id,
                subject = %row.subject,
                "Skipping candidate row for a subject the requester does not hold"
            );
            continue;
        };

        let score = affinity_score(my_confidence, row.confidence);

        let idx = *index_by_id.entry(row.id).or_insert_with(|| {
            accumulators.push(Accumulator {
                id: row.id,
                name: row.name.clone(),
                email: row.email.clone(),
                role: row.role,
                subjects: BTreeMap::new(),
                score: 0,
            });
            accumulators.len() - 1
        });

        let acc = &mut accumulators[idx];
        acc.subjects.insert(row.subject, row.confidence);
        acc.score += score;
    }

    // sort_by is stable, so equal scores keep first-seen order
    accumulators.sort_by(|a, b| b.score.cmp(&a.score));
    accumulators.truncate(limit);

    accumulators.into_iter().map(RankedMatch::from).collect()
}

/// Finds the best peer matches for `user_id`
///
/// A requester without any recorded subjects gets up to ten arbitrary active
/// users, unscored.
pub async fn find_peer_matches<U, C>(
    users: &U,
    confidence: &C,
    user_id: i64,
) -> AppResult<PeerMatches>
where
    U: UserStore + ?Sized,
    C: ConfidenceStore + ?Sized,
{
    let mine = confidence.subjects_for_user(user_id).await?;

    if mine.is_empty() {
        let peers = users
            .active_users_except(user_id, MAX_MATCHES as i64)
            .await?;

        tracing::info!(
            user_id,
            returned = peers.len(),
            "No subject data for requester, returning unscored peers"
        );

        return Ok(PeerMatches::Unscored(peers));
    }

    let subjects: Vec<String> = mine.iter().map(|s| s.subject.clone()).collect();
    let candidates = confidence
        .candidate_rows(user_id, &subjects, CANDIDATE_POOL_LIMIT)
        .await?;

    let pool_size = candidates.len();
    let ranked = rank_candidates(&mine, candidates, MAX_MATCHES);

    tracing::info!(
        user_id,
        subjects = subjects.len(),
        pool_size,
        returned = ranked.len(),
        "Peer matches computed"
    );

    Ok(PeerMatches::Ranked(ranked))
}
