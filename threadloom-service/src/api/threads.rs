//! Thread generation endpoint for the dashboard tool.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::api::{AppState, CurrentSession};
use crate::auth::{AccessLevel, authorize};
use crate::error::ServiceResult;
use crate::threads::{ThreadRequest, ThreadResponse};

/// POST /api/threads/generate - generate a social thread from a topic
pub async fn generate_thread_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(request): Json<ThreadRequest>,
) -> ServiceResult<Json<ThreadResponse>> {
    authorize(AccessLevel::Authenticated, session.as_ref(), &state.store)?;
    Ok(Json(state.threads.generate(&request).await?))
}
