//! Connection probes for the configured providers.
//!
//! A probe exercises one provider with the credentials currently stored and
//! returns an ordered transcript of what happened. Provider failures are
//! part of the result, not errors: the caller is an admin staring at a
//! settings form, and the transcript is the diagnostic. Only failures to
//! read the settings themselves propagate as errors.

use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::EndpointsConfig;
use crate::error::{MailError, ServiceResult};
use crate::providers::{AiClient, MailClient, OutgoingMail, PaymentClient, StorageClient};
use crate::settings::SettingsStore;

/// Which provider a probe targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ProbeKind {
    Ai,
    Payment,
    Storage,
    Mail,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Transcript and verdict of one probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    pub success: bool,
    pub message: String,
    pub logs: Vec<String>,
}

impl ProbeOutcome {
    fn succeeded(message: String, logs: Vec<String>) -> Self {
        Self {
            success: true,
            message,
            logs,
        }
    }

    fn failed(mut logs: Vec<String>, error: impl std::fmt::Display, message: &str) -> Self {
        logs.push(format!("Connection failed: {error}"));
        Self {
            success: false,
            message: message.to_string(),
            logs,
        }
    }
}

/// Runs connection probes with transient provider clients
pub struct ConnectionProber {
    store: SettingsStore,
    endpoints: EndpointsConfig,
    timeout: Duration,
}

impl ConnectionProber {
    pub fn new(store: SettingsStore, endpoints: EndpointsConfig, timeout: Duration) -> Self {
        Self {
            store,
            endpoints,
            timeout,
        }
    }

    /// Run one probe and record its verdict
    pub async fn probe(&self, kind: ProbeKind) -> ServiceResult<ProbeOutcome> {
        let outcome = match kind {
            ProbeKind::Ai => self.probe_ai().await?,
            ProbeKind::Payment => self.probe_payment().await?,
            ProbeKind::Storage => self.probe_storage().await?,
            ProbeKind::Mail => self.probe_mail().await?,
        };

        let verdict = if outcome.success { "success" } else { "failure" };
        metrics::counter!(
            "threadloom_probes_total",
            "kind" => kind.as_str(),
            "outcome" => verdict
        )
        .increment(1);

        if outcome.success {
            info!(kind = %kind, "connection probe succeeded");
        } else {
            warn!(kind = %kind, message = %outcome.message, "connection probe failed");
        }

        Ok(outcome)
    }

    async fn probe_ai(&self) -> ServiceResult<ProbeOutcome> {
        let mut logs = Vec::new();
        let settings = self.store.ai()?;

        let client =
            match AiClient::from_settings(&settings, &self.endpoints.ai_gateway, self.timeout) {
                Ok(client) => client,
                Err(e) => {
                    return Ok(ProbeOutcome::failed(logs, e, "Failed to connect to AI provider"));
                }
            };

        let model = client.model();
        logs.push(format!(
            "Testing connection to {} ({})...",
            model.name, model.provider
        ));

        match client.complete("Hello, world!").await {
            Ok(completion) => {
                logs.push(format!("Request: {}", completion.request_body));
                logs.push(format!("Response: {}", completion.text));
                Ok(ProbeOutcome::succeeded(
                    format!("Successfully connected to {}", model.name),
                    logs,
                ))
            }
            Err(e) => Ok(ProbeOutcome::failed(logs, e, "Failed to connect to AI provider")),
        }
    }

    async fn probe_payment(&self) -> ServiceResult<ProbeOutcome> {
        let mut logs = Vec::new();
        let settings = self.store.payment()?;

        let client =
            match PaymentClient::from_settings(&settings, &self.endpoints, self.timeout) {
                Ok(client) => client,
                Err(e) => {
                    return Ok(ProbeOutcome::failed(
                        logs,
                        e,
                        "Failed to connect to payment provider",
                    ));
                }
            };

        let name = client.provider().display_name();
        logs.push(format!("Testing connection to {name}..."));

        match client.verify_identity().await {
            Ok(status) => {
                logs.push(format!("Identity endpoint returned status {status}"));
                Ok(ProbeOutcome::succeeded(
                    format!("Successfully connected to {name}"),
                    logs,
                ))
            }
            Err(e) => Ok(ProbeOutcome::failed(
                logs,
                e,
                "Failed to connect to payment provider",
            )),
        }
    }

    async fn probe_storage(&self) -> ServiceResult<ProbeOutcome> {
        let mut logs = Vec::new();
        let settings = self.store.storage()?;

        let client =
            match StorageClient::from_settings(&settings, &self.endpoints.storage, self.timeout) {
                Ok(client) => client,
                Err(e) => {
                    return Ok(ProbeOutcome::failed(
                        logs,
                        e,
                        "Failed to connect to storage provider",
                    ));
                }
            };

        let provider = client.provider();
        logs.push(format!("Testing connection to {}...", provider.name));

        if provider.has_usage_endpoint {
            match client.usage_info().await {
                Ok(usage) => logs.push(format!(
                    "Usage info: {}",
                    serde_json::to_string(&usage).unwrap_or_default()
                )),
                Err(e) => {
                    return Ok(ProbeOutcome::failed(
                        logs,
                        e,
                        "Failed to connect to storage provider",
                    ));
                }
            }
        }

        Ok(ProbeOutcome::succeeded(
            "Successfully connected to storage provider".to_string(),
            logs,
        ))
    }

    async fn probe_mail(&self) -> ServiceResult<ProbeOutcome> {
        let mut logs = Vec::new();
        let site = self.store.site()?;
        let mail = self.store.mail()?;

        let client = match MailClient::new(&mail.api_key, &self.endpoints.mail, self.timeout) {
            Ok(client) => client,
            Err(e) => {
                return Ok(ProbeOutcome::failed(logs, e, "Failed to connect to mail provider"));
            }
        };

        logs.push("Testing connection to mail provider...".to_string());

        let message = OutgoingMail {
            from: format!("{} <{}>", site.name, mail.from_email),
            to: format!("{} <{}>", mail.to_name, mail.to_email),
            reply_to: None,
            subject: "Test email".to_string(),
            text: "This is a test email".to_string(),
        };

        match client.send(&message).await {
            Ok(sent) => {
                logs.push(format!("Response: {}", serde_json::json!({ "id": sent.id })));
                logs.push(format!("Email successfully sent to {}", mail.to_email));
                Ok(ProbeOutcome::succeeded(
                    "Successfully connected to mail provider".to_string(),
                    logs,
                ))
            }
            Err(e) => {
                if let MailError::Api { message, .. } = &e {
                    logs.push(format!("Error: {message}"));
                }
                Ok(ProbeOutcome::failed(logs, e, "Failed to connect to mail provider"))
            }
        }
    }
}
