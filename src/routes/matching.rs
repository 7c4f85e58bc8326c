use axum::{extract::State, Json};

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{MatchResponse, Role},
    services::matching::find_peer_matches,
};

use super::AppState;

/// Handler for peer matching endpoint
pub async fn peers(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MatchResponse>> {
    auth.require_role(&[Role::Student, Role::PeerMentor])?;

    let matches = find_peer_matches(&*state.store, &*state.store, auth.id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = auth.id, error = %e, "Peer matching failed");
            AppError::Internal("Failed to compute peer matches".to_string())
        })?;

    Ok(Json(MatchResponse { matches }))
}
