//! Typed facade over the persisted settings record.
//!
//! Handlers and background services go through `SettingsStore` rather than
//! the database directly, so every read passes schema validation and every
//! write goes through the domain merge.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{Database, SettingsRecord};
use crate::error::{DatabaseError, ServiceResult};
use crate::settings::schema::{
    self, AccountSettings, AiSettings, AuthSettings, DownloadSettings, GeneralSettings,
    MailSettings, PaymentSettings, PerformanceAlerts, SettingsDomain, SiteSettings,
    StorageSettings, WebhookSettings,
};

/// Shared handle to the settings record
#[derive(Clone)]
pub struct SettingsStore {
    db: Arc<Database>,
}

impl SettingsStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Raw record, if one exists
    pub fn record(&self) -> ServiceResult<Option<SettingsRecord>> {
        self.db.fetch_settings()
    }

    /// Raw record, creating the empty shell on first access
    pub fn get_or_create(&self) -> ServiceResult<SettingsRecord> {
        self.db.get_or_create_settings()
    }

    /// Parse one sub-document out of `general`, falling back to defaults
    pub fn read_domain<T>(&self, domain: SettingsDomain) -> ServiceResult<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let record = self.get_or_create()?;
        let value = record.general.get(domain.key());
        Ok(schema::parse_domain(domain, value)?)
    }

    /// Parse the full `general` document
    pub fn general(&self) -> ServiceResult<GeneralSettings> {
        let record = self.get_or_create()?;
        Ok(schema::parse_general(&record.general)?)
    }

    /// Parse the `account` document
    pub fn account(&self) -> ServiceResult<AccountSettings> {
        let record = self.get_or_create()?;
        Ok(schema::parse_account(Some(&record.account))?)
    }

    pub fn site(&self) -> ServiceResult<SiteSettings> {
        self.read_domain(SettingsDomain::Site)
    }

    pub fn auth(&self) -> ServiceResult<AuthSettings> {
        self.read_domain(SettingsDomain::Auth)
    }

    pub fn ai(&self) -> ServiceResult<AiSettings> {
        self.read_domain(SettingsDomain::Ai)
    }

    pub fn payment(&self) -> ServiceResult<PaymentSettings> {
        self.read_domain(SettingsDomain::Payment)
    }

    pub fn webhook(&self) -> ServiceResult<WebhookSettings> {
        self.read_domain(SettingsDomain::Webhook)
    }

    pub fn storage(&self) -> ServiceResult<StorageSettings> {
        self.read_domain(SettingsDomain::Storage)
    }

    pub fn download(&self) -> ServiceResult<DownloadSettings> {
        self.read_domain(SettingsDomain::Download)
    }

    pub fn mail(&self) -> ServiceResult<MailSettings> {
        self.read_domain(SettingsDomain::Mail)
    }

    pub fn performance_alerts(&self) -> ServiceResult<PerformanceAlerts> {
        self.read_domain(SettingsDomain::PerformanceAlerts)
    }

    /// Replace one sub-document of `general`, leaving siblings intact
    pub fn update_domain<T: Serialize>(
        &self,
        domain: SettingsDomain,
        value: &T,
    ) -> ServiceResult<SettingsRecord> {
        let value = serde_json::to_value(value).map_err(DatabaseError::Serialization)?;
        let record = self.db.merge_settings_domain(domain, value)?;
        metrics::counter!("threadloom_settings_updates_total", "domain" => domain.key())
            .increment(1);
        Ok(record)
    }

    /// Replace the whole `general` document
    pub fn update_general(&self, general: &GeneralSettings) -> ServiceResult<SettingsRecord> {
        let value = serde_json::to_value(general).map_err(DatabaseError::Serialization)?;
        let record = self.db.replace_settings_general(value)?;
        metrics::counter!("threadloom_settings_updates_total", "domain" => "general")
            .increment(1);
        Ok(record)
    }

    /// Replace the `account` document
    pub fn update_account(&self, account: &AccountSettings) -> ServiceResult<SettingsRecord> {
        let value = serde_json::to_value(account).map_err(DatabaseError::Serialization)?;
        let record = self.db.replace_settings_account(value)?;
        metrics::counter!("threadloom_settings_updates_total", "domain" => "account")
            .increment(1);
        Ok(record)
    }
}
