//! Client for the configured storage provider.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;
use crate::settings::catalog::{StorageProviderInfo, find_storage_provider};
use crate::settings::schema::StorageSettings;

/// Storage provider client bound to the first enabled provider
#[derive(Debug)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    api_key: String,
    provider: &'static StorageProviderInfo,
}

/// Usage figures reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub app_total_bytes: u64,
    #[serde(default)]
    pub files_uploaded: u64,
    #[serde(default)]
    pub limit_bytes: u64,
}

impl StorageClient {
    pub fn from_settings(
        settings: &StorageSettings,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let provider = settings
            .enabled_providers
            .iter()
            .find_map(|key| find_storage_provider(key))
            .ok_or_else(|| ProviderError::Unconfigured {
                provider: "storage".to_string(),
                message: "no storage provider enabled".to_string(),
            })?;

        let client = super::build_http_client(timeout, base_url)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: settings.api_key.clone(),
            provider,
        })
    }

    /// The provider this client resolved to
    pub fn provider(&self) -> &'static StorageProviderInfo {
        self.provider
    }

    /// Fetch usage figures. Only providers with a usage endpoint support
    /// this; callers check `provider().has_usage_endpoint` first.
    pub async fn usage_info(&self) -> Result<StorageUsage, ProviderError> {
        let url = format!("{}/v6/getUsageInfo", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-uploadthing-api-key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| ProviderError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: self.provider.name.to_string(),
                status,
                message,
            });
        }

        let usage: StorageUsage =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: self.provider.name.to_string(),
                    source: serde_json::Error::io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        e.to_string(),
                    )),
                })?;

        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(providers: &[&str]) -> StorageSettings {
        StorageSettings {
            api_key: "ut-key".to_string(),
            enabled_providers: providers.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolves_first_known_provider() {
        let client = StorageClient::from_settings(
            &settings(&["unknown", "s3", "ut"]),
            "http://127.0.0.1:1",
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(client.provider().key, "s3");
        assert!(!client.provider().has_usage_endpoint);
    }

    #[test]
    fn test_no_enabled_provider_is_unconfigured() {
        let err = StorageClient::from_settings(
            &settings(&[]),
            "http://127.0.0.1:1",
            Duration::from_secs(1),
        )
        .expect_err("should fail");
        assert!(matches!(err, ProviderError::Unconfigured { .. }));
    }

    #[test]
    fn test_usage_round_trips_camel_case() {
        let usage: StorageUsage = serde_json::from_value(serde_json::json!({
            "totalBytes": 1024,
            "appTotalBytes": 512,
            "filesUploaded": 3,
            "limitBytes": 2_147_483_648u64,
        }))
        .expect("deserialize");
        assert_eq!(usage.total_bytes, 1024);
        assert_eq!(usage.files_uploaded, 3);

        let value = serde_json::to_value(&usage).expect("serialize");
        assert_eq!(value["appTotalBytes"], 512);
    }
}
