//! Client for the OpenAI-compatible AI gateway.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;
use crate::settings::AiSettings;
use crate::settings::catalog::{AiModel, find_ai_model};

const PROVIDER_LABEL: &str = "AI gateway";

/// Gateway client bound to one resolved model
#[derive(Debug)]
pub struct AiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: &'static AiModel,
}

/// One completed generation, with the request body that produced it
#[derive(Debug, Clone)]
pub struct AiCompletion {
    pub text: String,
    pub request_body: String,
}

impl AiClient {
    /// Build a client for the first enabled model that resolves against the
    /// catalog. An empty or fully-retired model list cannot be probed; that
    /// is the state the model cleanup exists to repair.
    pub fn from_settings(
        settings: &AiSettings,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let model = settings
            .enabled_models
            .iter()
            .find_map(|key| find_ai_model(key))
            .ok_or_else(|| ProviderError::Unconfigured {
                provider: PROVIDER_LABEL.to_string(),
                message: if settings.enabled_models.is_empty() {
                    "no AI models enabled".to_string()
                } else {
                    "no enabled AI model matches the catalog".to_string()
                },
            })?;

        let client = super::build_http_client(timeout, base_url)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: settings.api_key.clone(),
            model,
        })
    }

    /// The model this client resolved to
    pub fn model(&self) -> &'static AiModel {
        self.model
    }

    /// Run one text generation through the gateway
    pub async fn complete(&self, prompt: &str) -> Result<AiCompletion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: format!("{}/{}", self.model.provider, self.model.key),
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };
        let request_body = serde_json::to_string(&request).unwrap_or_default();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
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
                provider: PROVIDER_LABEL.to_string(),
                status,
                message,
            });
        }

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER_LABEL.to_string(),
                    source: serde_json::Error::io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        e.to_string(),
                    )),
                })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(AiCompletion { text, request_body })
    }
}

// Wire types for the chat completions endpoint

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}
