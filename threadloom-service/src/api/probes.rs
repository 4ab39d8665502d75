//! Connection test endpoints for the settings forms.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::api::{AppState, CurrentSession};
use crate::auth::{AccessLevel, authorize};
use crate::error::ServiceResult;
use crate::probe::{ProbeKind, ProbeOutcome};

/// POST /api/settings/ai/test - probe the AI gateway with the stored key
pub async fn test_ai_connection_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<ProbeOutcome>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.prober.probe(ProbeKind::Ai).await?))
}

/// POST /api/settings/payment/test - verify the payment provider identity
pub async fn test_payment_connection_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<ProbeOutcome>> {
    authorize(AccessLevel::AdminPayment, session.as_ref(), &state.store)?;
    Ok(Json(state.prober.probe(ProbeKind::Payment).await?))
}

/// POST /api/settings/storage/test - probe the storage provider
pub async fn test_storage_connection_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<ProbeOutcome>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.prober.probe(ProbeKind::Storage).await?))
}

/// POST /api/settings/mail/test - send the canned test email
pub async fn test_mail_connection_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<ProbeOutcome>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.prober.probe(ProbeKind::Mail).await?))
}
