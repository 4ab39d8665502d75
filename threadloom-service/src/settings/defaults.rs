//! Default values for every settings sub-document.
//!
//! A field absent from a stored document always resolves to one of these;
//! absence is never an error. The serde attributes in `schema` and the
//! `Default` impls here must stay in agreement.

use super::catalog::{FALLBACK_AI_MODEL, SocialProvider};
use super::schema::{
    AccountSettings, AiSettings, AuthSettings, DownloadSettings, MailSettings, PaymentSettings,
    PerformanceAlerts, SiteSettings, StorageSettings, Theme, WebhookSettings,
};

pub(crate) fn site_name() -> String {
    "ThreadLoom".to_string()
}

pub(crate) fn site_description() -> String {
    "AI-assisted social publishing platform".to_string()
}

pub(crate) fn site_url() -> String {
    "https://threadloom.app".to_string()
}

pub(crate) fn enabled_social_providers() -> Vec<SocialProvider> {
    vec![SocialProvider::Github]
}

pub(crate) fn enabled_ai_models() -> Vec<String> {
    vec![FALLBACK_AI_MODEL.to_string()]
}

pub(crate) fn currency() -> String {
    "USD".to_string()
}

pub(crate) fn success_rate_threshold() -> f64 {
    85.0
}

pub(crate) fn growth_threshold() -> f64 {
    -10.0
}

pub(crate) fn error_rate_threshold() -> f64 {
    5.0
}

pub(crate) fn alerts_enabled() -> bool {
    true
}

pub(crate) fn email_notifications() -> bool {
    true
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: site_name(),
            description: site_description(),
            url: site_url(),
            logo_url: None,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled_providers: enabled_social_providers(),
            credentials: Default::default(),
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            enabled_models: enabled_ai_models(),
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: String::new(),
            currency: currency(),
        }
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            enabled_providers: Vec::new(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            extension_url: String::new(),
            version: String::new(),
            enabled: false,
        }
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_email: String::new(),
            to_email: String::new(),
            to_name: String::new(),
        }
    }
}

impl Default for PerformanceAlerts {
    fn default() -> Self {
        Self {
            success_rate_threshold: success_rate_threshold(),
            growth_threshold: growth_threshold(),
            error_rate_threshold: error_rate_threshold(),
            enabled: alerts_enabled(),
        }
    }
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            email_notifications: email_notifications(),
            marketing_emails: false,
        }
    }
}
