//! Settings API endpoints for the admin dashboard.
//!
//! Write bodies arrive as raw JSON and go through the schema parser, so a
//! malformed sub-document is rejected with the offending domain named in the
//! response. Parsed writes are returned to the caller in normalized form,
//! with schema defaults filled in.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::{AppState, CurrentSession};
use crate::auth::{AccessLevel, authorize};
use crate::error::ServiceResult;
use crate::settings::schema::{parse_domain, parse_general};
use crate::settings::{
    AccountSettings, AiSettings, AuthSettings, CleanupReport, DownloadSettings, GeneralSettings,
    MailSettings, PaymentSettings, PerformanceAlerts, SettingsDomain, SiteSettings,
    SocialProvider, StorageSettings, WebhookSettings, cleanup_invalid_models, parse_account,
};

/// Response for GET /api/settings/auth/providers
#[derive(Debug, Serialize)]
pub struct AuthProvidersResponse {
    pub providers: Vec<SocialProvider>,
}

/// Response for GET /api/settings/payment/currency
#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub currency: String,
}

// === Public reads ===

/// GET /api/settings/site - site identity shown on public pages
pub async fn get_site_handler(
    State(state): State<Arc<AppState>>,
) -> ServiceResult<Json<SiteSettings>> {
    Ok(Json(state.store.site()?))
}

/// GET /api/settings/auth/providers - enabled social login providers.
///
/// Served from the arc-swapped snapshot, not the store: this endpoint sits
/// on the login path and must not take the database lock.
pub async fn get_auth_providers_handler(
    State(state): State<Arc<AppState>>,
) -> Json<AuthProvidersResponse> {
    let snapshot = state.auth_snapshot.load();
    Json(AuthProvidersResponse {
        providers: snapshot.enabled_providers.clone(),
    })
}

/// GET /api/settings/payment/currency - display currency for pricing pages
pub async fn get_currency_handler(
    State(state): State<Arc<AppState>>,
) -> ServiceResult<Json<CurrencyResponse>> {
    let payment = state.store.payment()?;
    Ok(Json(CurrencyResponse {
        currency: payment.currency,
    }))
}

/// GET /api/settings/download - browser extension download pointer
pub async fn get_download_handler(
    State(state): State<Arc<AppState>>,
) -> ServiceResult<Json<DownloadSettings>> {
    Ok(Json(state.store.download()?))
}

// === Authenticated account settings ===

/// GET /api/settings/account - the caller's account preferences
pub async fn get_account_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<AccountSettings>> {
    authorize(AccessLevel::Authenticated, session.as_ref(), &state.store)?;
    Ok(Json(state.store.account()?))
}

/// PUT /api/settings/account - replace account preferences
pub async fn update_account_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<AccountSettings>> {
    authorize(AccessLevel::Authenticated, session.as_ref(), &state.store)?;
    let account = parse_account(Some(&body))?;
    state.store.update_account(&account)?;
    Ok(Json(account))
}

// === Admin reads & writes ===

/// GET /api/settings/general - the full general document
pub async fn get_general_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<GeneralSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.general()?))
}

/// PUT /api/settings/general - replace the full general document
pub async fn update_general_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<GeneralSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let general = parse_general(&body)?;
    state.store.update_general(&general)?;
    state.auth_snapshot.store(Arc::new(general.auth.clone()));
    Ok(Json(general))
}

/// PUT /api/settings/site - update site identity
pub async fn update_site_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<SiteSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let site: SiteSettings = parse_domain(SettingsDomain::Site, Some(&body))?;
    state.store.update_domain(SettingsDomain::Site, &site)?;
    Ok(Json(site))
}

/// GET /api/settings/auth - social login configuration including credentials
pub async fn get_auth_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<AuthSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.auth()?))
}

/// PUT /api/settings/auth - update social login configuration
pub async fn update_auth_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<AuthSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let auth: AuthSettings = parse_domain(SettingsDomain::Auth, Some(&body))?;
    state.store.update_domain(SettingsDomain::Auth, &auth)?;
    state.auth_snapshot.store(Arc::new(auth.clone()));
    Ok(Json(auth))
}

/// GET /api/settings/ai - AI gateway configuration
pub async fn get_ai_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<AiSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.ai()?))
}

/// PUT /api/settings/ai - update AI gateway configuration
pub async fn update_ai_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<AiSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let ai: AiSettings = parse_domain(SettingsDomain::Ai, Some(&body))?;
    state.store.update_domain(SettingsDomain::Ai, &ai)?;
    Ok(Json(ai))
}

/// POST /api/settings/ai/cleanup - reconcile stored models with the catalog
pub async fn cleanup_models_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<CleanupReport>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(cleanup_invalid_models(&state.store)?))
}

/// GET /api/settings/payment - payment provider configuration
pub async fn get_payment_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<PaymentSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.payment()?))
}

/// PUT /api/settings/payment - update payment provider configuration
pub async fn update_payment_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<PaymentSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let payment: PaymentSettings = parse_domain(SettingsDomain::Payment, Some(&body))?;
    state.store.update_domain(SettingsDomain::Payment, &payment)?;
    Ok(Json(payment))
}

/// GET /api/settings/storage - storage provider configuration
pub async fn get_storage_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<StorageSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.storage()?))
}

/// PUT /api/settings/storage - update storage provider configuration
pub async fn update_storage_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<StorageSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let storage: StorageSettings = parse_domain(SettingsDomain::Storage, Some(&body))?;
    state.store.update_domain(SettingsDomain::Storage, &storage)?;
    Ok(Json(storage))
}

/// PUT /api/settings/download - update the extension download pointer
pub async fn update_download_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<DownloadSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let download: DownloadSettings = parse_domain(SettingsDomain::Download, Some(&body))?;
    state.store.update_domain(SettingsDomain::Download, &download)?;
    Ok(Json(download))
}

/// GET /api/settings/mail - outbound mail configuration
pub async fn get_mail_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<MailSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.mail()?))
}

/// PUT /api/settings/mail - update outbound mail configuration
pub async fn update_mail_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<MailSettings>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let mail: MailSettings = parse_domain(SettingsDomain::Mail, Some(&body))?;
    state.store.update_domain(SettingsDomain::Mail, &mail)?;
    Ok(Json(mail))
}

/// GET /api/settings/performance-alerts - alert thresholds
pub async fn get_performance_alerts_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<PerformanceAlerts>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    Ok(Json(state.store.performance_alerts()?))
}

/// PUT /api/settings/performance-alerts - update alert thresholds
pub async fn update_performance_alerts_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<PerformanceAlerts>> {
    authorize(AccessLevel::Admin, session.as_ref(), &state.store)?;
    let alerts: PerformanceAlerts = parse_domain(SettingsDomain::PerformanceAlerts, Some(&body))?;
    state
        .store
        .update_domain(SettingsDomain::PerformanceAlerts, &alerts)?;
    Ok(Json(alerts))
}

// === Admin + payment capability ===

/// GET /api/settings/webhook - payment webhook signing secret
pub async fn get_webhook_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> ServiceResult<Json<WebhookSettings>> {
    authorize(AccessLevel::AdminPayment, session.as_ref(), &state.store)?;
    Ok(Json(state.store.webhook()?))
}

/// PUT /api/settings/webhook - rotate the payment webhook signing secret
pub async fn update_webhook_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<Value>,
) -> ServiceResult<Json<WebhookSettings>> {
    authorize(AccessLevel::AdminPayment, session.as_ref(), &state.store)?;
    let webhook: WebhookSettings = parse_domain(SettingsDomain::Webhook, Some(&body))?;
    state.store.update_domain(SettingsDomain::Webhook, &webhook)?;
    Ok(Json(webhook))
}
