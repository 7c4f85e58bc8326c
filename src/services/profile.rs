use crate::{
    db::ConfidenceStore,
    error::{AppError, AppResult},
    models::UpsertConfidenceRequest,
};

/// Checks a confidence submission, returning the trimmed subject and in-range value
pub fn validate_confidence(request: &UpsertConfidenceRequest) -> AppResult<(String, i32)> {
    let subject = request.subject.trim();
    if subject.is_empty() {
        return Err(AppError::InvalidInput("Subject is required".to_string()));
    }

    let confidence = i32::try_from(request.confidence)
        .ok()
        .filter(|c| (0..=100).contains(c))
        .ok_or_else(|| {
            AppError::InvalidInput("Confidence must be an integer between 0 and 100".to_string())
        })?;

    Ok((subject.to_string(), confidence))
}

/// Inserts or overwrites one subject confidence for the user
pub async fn record_confidence<C: ConfidenceStore + ?Sized>(
    store: &C,
    user_id: i64,
    request: UpsertConfidenceRequest,
) -> AppResult<()> {
    let (subject, confidence) = validate_confidence(&request)?;
    store.upsert_confidence(user_id, &subject, confidence).await?;

    tracing::debug!(user_id, subject = %subject, confidence, "Confidence saved");
    Ok(())
}
