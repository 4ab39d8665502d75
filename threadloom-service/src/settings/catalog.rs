//! Canonical catalogs for AI models and providers.
//!
//! Stored settings reference providers and models by key; everything here is
//! the authoritative list those keys are resolved against.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Catalog entry for an AI model reachable through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiModel {
    pub key: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
}

/// Substituted when sanitization would otherwise leave no enabled models
pub const FALLBACK_AI_MODEL: &str = "gpt-4o-mini";

pub const AI_MODEL_CATALOG: &[AiModel] = &[
    AiModel {
        key: "gpt-4o-mini",
        name: "GPT-4o Mini",
        provider: "openai",
    },
    AiModel {
        key: "gpt-4o",
        name: "GPT-4o",
        provider: "openai",
    },
    AiModel {
        key: "gpt-4.1-mini",
        name: "GPT-4.1 Mini",
        provider: "openai",
    },
    AiModel {
        key: "claude-3-5-sonnet",
        name: "Claude 3.5 Sonnet",
        provider: "anthropic",
    },
    AiModel {
        key: "claude-3-5-haiku",
        name: "Claude 3.5 Haiku",
        provider: "anthropic",
    },
    AiModel {
        key: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        provider: "google",
    },
    AiModel {
        key: "llama-3.3-70b",
        name: "Llama 3.3 70B",
        provider: "meta",
    },
];

/// Look up a model by its catalog key
pub fn find_ai_model(key: &str) -> Option<&'static AiModel> {
    AI_MODEL_CATALOG.iter().find(|model| model.key == key)
}

pub fn is_known_ai_model(key: &str) -> bool {
    find_ai_model(key).is_some()
}

/// Catalog entry for a file-storage vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageProviderInfo {
    pub key: &'static str,
    pub name: &'static str,
    /// Whether the vendor exposes a usage-info endpoint the prober can call
    pub has_usage_endpoint: bool,
}

pub const STORAGE_PROVIDERS: &[StorageProviderInfo] = &[
    StorageProviderInfo {
        key: "ut",
        name: "UploadThing",
        has_usage_endpoint: true,
    },
    StorageProviderInfo {
        key: "s3",
        name: "Amazon S3",
        has_usage_endpoint: false,
    },
];

pub fn find_storage_provider(key: &str) -> Option<&'static StorageProviderInfo> {
    STORAGE_PROVIDERS.iter().find(|provider| provider.key == key)
}

/// Supported payment vendors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Polar,
}

impl PaymentProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "Stripe",
            PaymentProvider::Polar => "Polar",
        }
    }

    /// Path of the identity endpoint used by the connection probe
    pub fn identity_path(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "/v1/account",
            PaymentProvider::Polar => "/v1/organizations/",
        }
    }
}

/// Social login providers the dashboard can enable
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SocialProvider {
    Github,
    Google,
    Discord,
    Twitter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_model_is_in_catalog() {
        assert!(is_known_ai_model(FALLBACK_AI_MODEL));
    }

    #[test]
    fn test_find_ai_model() {
        let model = find_ai_model("claude-3-5-sonnet").expect("model in catalog");
        assert_eq!(model.name, "Claude 3.5 Sonnet");
        assert_eq!(model.provider, "anthropic");
        assert!(find_ai_model("bogus-model").is_none());
    }

    #[test]
    fn test_storage_provider_capabilities() {
        assert!(find_storage_provider("ut").expect("ut").has_usage_endpoint);
        assert!(!find_storage_provider("s3").expect("s3").has_usage_endpoint);
        assert!(find_storage_provider("gcs").is_none());
    }

    #[test]
    fn test_payment_provider_serde_round_trip() {
        let provider: PaymentProvider = serde_json::from_str("\"stripe\"").expect("parse");
        assert_eq!(provider, PaymentProvider::Stripe);
        assert_eq!(provider.identity_path(), "/v1/account");
        assert_eq!(serde_json::to_string(&PaymentProvider::Polar).expect("ser"), "\"polar\"");
    }
}
