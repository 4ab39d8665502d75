//! Identity check against the configured payment provider.

use reqwest::Client;
use std::time::Duration;

use crate::config::EndpointsConfig;
use crate::error::ProviderError;
use crate::settings::catalog::PaymentProvider;
use crate::settings::schema::PaymentSettings;

/// Payment provider client for identity-only calls
#[derive(Debug)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    api_key: String,
    provider: PaymentProvider,
}

impl PaymentClient {
    pub fn from_settings(
        settings: &PaymentSettings,
        endpoints: &EndpointsConfig,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let provider = settings.provider.ok_or_else(|| ProviderError::Unconfigured {
            provider: "payment".to_string(),
            message: "no payment provider configured".to_string(),
        })?;

        let base_url = match provider {
            PaymentProvider::Stripe => endpoints.stripe.clone(),
            PaymentProvider::Polar => endpoints.polar.clone(),
        };

        let client = super::build_http_client(timeout, &base_url)?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            provider,
        })
    }

    /// The provider this client targets
    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    /// Hit the provider's identity endpoint with the stored key.
    ///
    /// A 2xx proves the key is live; the body itself is provider-specific
    /// and discarded.
    pub async fn verify_identity(&self) -> Result<u16, ProviderError> {
        let url = format!("{}{}", self.base_url, self.provider.identity_path());

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Connection {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: self.provider.display_name().to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_is_unconfigured() {
        let settings = PaymentSettings::default();
        let err = PaymentClient::from_settings(
            &settings,
            &EndpointsConfig::default(),
            Duration::from_secs(1),
        )
        .expect_err("should fail");
        assert!(matches!(err, ProviderError::Unconfigured { .. }));
    }

    #[test]
    fn test_base_url_follows_provider() {
        let mut settings = PaymentSettings::default();
        settings.provider = Some(PaymentProvider::Polar);
        settings.api_key = "polar_key".to_string();

        let client = PaymentClient::from_settings(
            &settings,
            &EndpointsConfig::default(),
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(client.base_url, "https://api.polar.sh");
        assert_eq!(client.provider(), PaymentProvider::Polar);
    }
}
