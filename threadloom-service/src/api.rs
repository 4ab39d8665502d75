//! HTTP API for the ThreadLoom console service.
//!
//! This module provides the REST API endpoints for:
//! - Health and metrics monitoring
//! - Settings reads and writes, one route pair per sub-document
//! - Connection probes for the configured providers
//! - Support/contact mail and thread generation

use arc_swap::ArcSwap;
use axum::{
    Json, RequestPartsExt, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, header, request::Parts},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{DbSessionProvider, Session, SessionProvider};
use crate::config::{EndpointsConfig, StaticConfig};
use crate::db::Database;
use crate::error::ServiceError;
use crate::probe::ConnectionProber;
use crate::settings::schema;
use crate::settings::{AuthSettings, SettingsDomain, SettingsStore};
use crate::threads::ThreadGenerator;

pub mod mail;
pub mod probes;
pub mod settings;
pub mod threads;

use mail::{send_contact_mail_handler, send_support_mail_handler};
use probes::{
    test_ai_connection_handler, test_mail_connection_handler, test_payment_connection_handler,
    test_storage_connection_handler,
};
use settings::{
    cleanup_models_handler, get_account_handler, get_ai_handler, get_auth_handler,
    get_auth_providers_handler, get_currency_handler, get_download_handler, get_general_handler,
    get_mail_handler, get_payment_handler, get_performance_alerts_handler, get_site_handler,
    get_storage_handler, get_webhook_handler, update_account_handler, update_ai_handler,
    update_auth_handler, update_download_handler, update_general_handler, update_mail_handler,
    update_payment_handler, update_performance_alerts_handler, update_site_handler,
    update_storage_handler, update_webhook_handler,
};
use threads::generate_thread_handler;

/// Application state
pub struct AppState {
    pub db: Arc<Database>,
    pub store: SettingsStore,
    pub sessions: Arc<dyn SessionProvider>,
    pub prober: ConnectionProber,
    pub threads: ThreadGenerator,
    pub endpoints: EndpointsConfig,
    pub probe_timeout: Duration,
    /// Social-auth settings as last written, for lock-free reads on the
    /// login path. Refreshed by the auth and general update handlers.
    pub auth_snapshot: ArcSwap<AuthSettings>,
    pub metrics: PrometheusHandle,
    pub start_time: Instant,
}

/// The caller's session, if the request carried a resolvable bearer token.
///
/// Absence is not a rejection here; each handler states what level it
/// requires through the access gate, so public endpoints stay free for
/// anonymous callers.
pub struct CurrentSession(Option<Session>);

impl CurrentSession {
    pub fn as_ref(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok();

        let session = match bearer {
            Some(TypedHeader(auth)) => state.sessions.resolve(auth.token())?,
            None => None,
        };

        Ok(Self(session))
    }
}

/// Build the API router
pub fn router(db: Arc<Database>, config: &StaticConfig, metrics: PrometheusHandle) -> Router {
    let store = SettingsStore::new(db.clone());
    let sessions: Arc<dyn SessionProvider> = Arc::new(DbSessionProvider::new(
        db.clone(),
        config.auth.admin_token.clone(),
    ));
    let prober = ConnectionProber::new(
        store.clone(),
        config.endpoints.clone(),
        config.probe.timeout(),
    );
    let threads = ThreadGenerator::new(
        store.clone(),
        config.endpoints.clone(),
        config.threads.request_timeout(),
    );

    let state = Arc::new(AppState {
        auth_snapshot: ArcSwap::from_pointee(initial_auth_snapshot(&store)),
        db,
        store,
        sessions,
        prober,
        threads,
        endpoints: config.endpoints.clone(),
        probe_timeout: config.probe.timeout(),
        metrics,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let settings_routes = Router::new()
        // Per-operator account preferences
        .route("/account", get(get_account_handler))
        .route("/account", put(update_account_handler))
        // Whole general document
        .route("/general", get(get_general_handler))
        .route("/general", put(update_general_handler))
        // Site identity
        .route("/site", get(get_site_handler))
        .route("/site", put(update_site_handler))
        // Social login
        .route("/auth", get(get_auth_handler))
        .route("/auth", put(update_auth_handler))
        .route("/auth/providers", get(get_auth_providers_handler))
        // AI gateway
        .route("/ai", get(get_ai_handler))
        .route("/ai", put(update_ai_handler))
        .route("/ai/test", post(test_ai_connection_handler))
        .route("/ai/cleanup", post(cleanup_models_handler))
        // Payment provider
        .route("/payment", get(get_payment_handler))
        .route("/payment", put(update_payment_handler))
        .route("/payment/currency", get(get_currency_handler))
        .route("/payment/test", post(test_payment_connection_handler))
        // Payment webhook secret
        .route("/webhook", get(get_webhook_handler))
        .route("/webhook", put(update_webhook_handler))
        // Storage provider
        .route("/storage", get(get_storage_handler))
        .route("/storage", put(update_storage_handler))
        .route("/storage/test", post(test_storage_connection_handler))
        // Extension download pointer
        .route("/download", get(get_download_handler))
        .route("/download", put(update_download_handler))
        // Outbound mail
        .route("/mail", get(get_mail_handler))
        .route("/mail", put(update_mail_handler))
        .route("/mail/test", post(test_mail_connection_handler))
        // Alert thresholds
        .route("/performance-alerts", get(get_performance_alerts_handler))
        .route("/performance-alerts", put(update_performance_alerts_handler));

    let api_routes = Router::new()
        .nest("/settings", settings_routes)
        // Mail actions
        .route("/mail/support", post(send_support_mail_handler))
        .route("/mail/contact", post(send_contact_mail_handler))
        // Thread generation
        .route("/threads/generate", post(generate_thread_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prime the social-auth snapshot from storage.
///
/// Reads the raw record rather than going through `get_or_create` so that
/// booting against an empty database does not create the settings row just
/// to discover defaults.
fn initial_auth_snapshot(store: &SettingsStore) -> AuthSettings {
    match store.record() {
        Ok(Some(record)) => schema::parse_domain(
            SettingsDomain::Auth,
            record.general.get(SettingsDomain::Auth.key()),
        )
        .unwrap_or_default(),
        _ => AuthSettings::default(),
    }
}

// === Health & Metrics ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database_available = state.db.health_check();

    let status = if database_available {
        "healthy".to_string()
    } else {
        "degraded (database unavailable)".to_string()
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_available,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    database_available: bool,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
