//! Typed schemas for the settings sub-documents.
//!
//! Parsing is self-healing for absent fields (serde defaults) and strict for
//! present fields with the wrong shape. Wire names are camelCase to match the
//! documents the dashboard writes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum::{Display, EnumString, IntoStaticStr};

use super::catalog::{PaymentProvider, SocialProvider};
use super::defaults;
use crate::error::ValidationError;

/// The named sub-documents stored under the record's `general` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum SettingsDomain {
    Site,
    Auth,
    Ai,
    Payment,
    Webhook,
    Storage,
    Download,
    Mail,
    PerformanceAlerts,
}

impl SettingsDomain {
    /// JSON key of this sub-document inside `general`
    pub fn key(&self) -> &'static str {
        (*self).into()
    }
}

/// Public site identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default = "defaults::site_name")]
    pub name: String,

    #[serde(default = "defaults::site_description")]
    pub description: String,

    #[serde(default = "defaults::site_url")]
    pub url: String,

    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Social login configuration consumed by the auth layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    #[serde(default = "defaults::enabled_social_providers")]
    pub enabled_providers: Vec<SocialProvider>,

    /// Per-provider OAuth credentials, keyed by provider key. Keys are kept
    /// as strings so credentials for a retired provider survive a read.
    #[serde(default)]
    pub credentials: BTreeMap<String, OauthCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCredentials {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,
}

/// AI gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default)]
    pub api_key: String,

    /// Model keys, resolved against the catalog. Unknown keys are storable
    /// (the sanitizer reconciles them) but never usable.
    #[serde(default = "defaults::enabled_ai_models")]
    pub enabled_models: Vec<String>,
}

/// Payment vendor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    #[serde(default)]
    pub provider: Option<PaymentProvider>,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "defaults::currency")]
    pub currency: String,
}

/// Shared secret for payment webhooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettings {
    #[serde(default)]
    pub secret: String,
}

/// File storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub enabled_providers: Vec<String>,
}

/// Browser extension download metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSettings {
    #[serde(default)]
    pub extension_url: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub enabled: bool,
}

/// Outbound mail configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub from_email: String,

    #[serde(default)]
    pub to_email: String,

    #[serde(default)]
    pub to_name: String,
}

/// Alerting thresholds carried forward by every other mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAlerts {
    #[serde(default = "defaults::success_rate_threshold")]
    pub success_rate_threshold: f64,

    #[serde(default = "defaults::growth_threshold")]
    pub growth_threshold: f64,

    #[serde(default = "defaults::error_rate_threshold")]
    pub error_rate_threshold: f64,

    #[serde(default = "defaults::alerts_enabled")]
    pub enabled: bool,
}

/// The whole `general` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    #[serde(default)]
    pub site: SiteSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub ai: AiSettings,

    #[serde(default)]
    pub payment: PaymentSettings,

    #[serde(default)]
    pub webhook: WebhookSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub download: DownloadSettings,

    #[serde(default)]
    pub mail: MailSettings,

    #[serde(default)]
    pub performance_alerts: PerformanceAlerts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-operator account preferences, stored outside `general`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    #[serde(default)]
    pub theme: Theme,

    #[serde(default = "defaults::email_notifications")]
    pub email_notifications: bool,

    #[serde(default)]
    pub marketing_emails: bool,
}

/// Parse one sub-document, healing absence with defaults.
///
/// `None` and JSON null both mean "not stored yet" and produce the default;
/// a present value with the wrong shape is a `ValidationError`.
pub fn parse_domain<T>(domain: SettingsDomain, raw: Option<&Value>) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Default,
{
    match raw {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::new(domain.key(), e.to_string())),
    }
}

/// Parse the whole `general` document
pub fn parse_general(raw: &Value) -> Result<GeneralSettings, ValidationError> {
    if raw.is_null() {
        return Ok(GeneralSettings::default());
    }
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::new("general", e.to_string()))
}

/// Parse the `account` document
pub fn parse_account(raw: Option<&Value>) -> Result<AccountSettings, ValidationError> {
    match raw {
        None | Some(Value::Null) => Ok(AccountSettings::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::new("account", e.to_string())),
    }
}
