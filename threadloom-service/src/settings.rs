//! Settings domain model: schema, catalog, merge, and persistence facade.

pub mod catalog;
mod defaults;
mod merge;
pub mod schema;
mod sanitize;
mod store;

pub use catalog::{PaymentProvider, SocialProvider};
pub use merge::merge_general;
pub use sanitize::{CleanupReport, SanitizeOutcome, cleanup_invalid_models, sanitize_models};
pub use schema::{
    AccountSettings, AiSettings, AuthSettings, DownloadSettings, GeneralSettings, MailSettings,
    OauthCredentials, PaymentSettings, PerformanceAlerts, SettingsDomain, SiteSettings,
    StorageSettings, Theme, WebhookSettings, parse_account, parse_general,
};
pub use store::SettingsStore;
