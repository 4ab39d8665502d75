//! Client for the Resend-compatible mail API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MailError, ProviderError};

/// Mail API client
pub struct MailClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// One outgoing message. Addresses use the `Name <addr>` form the mail
/// provider expects.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, Deserialize)]
pub struct SentMail {
    #[serde(default)]
    pub id: String,
}

impl MailClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = super::build_http_client(timeout, base_url)?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Submit one message for delivery
    pub async fn send(&self, mail: &OutgoingMail) -> Result<SentMail, MailError> {
        let url = format!("{}/emails", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await
            .map_err(MailError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Api { status, message });
        }

        let sent: SentMail = response.json().await.map_err(|e| {
            MailError::InvalidResponse(serde_json::Error::io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?;

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_mail_wire_shape() {
        let mail = OutgoingMail {
            from: "ThreadLoom <noreply@threadloom.app>".to_string(),
            to: "Ops <ops@threadloom.app>".to_string(),
            reply_to: Some("Ada <ada@example.com>".to_string()),
            subject: "Test email".to_string(),
            text: "This is a test email".to_string(),
        };

        let body = serde_json::to_value(&mail).expect("serialize");
        assert_eq!(body["from"], "ThreadLoom <noreply@threadloom.app>");
        assert_eq!(body["reply_to"], "Ada <ada@example.com>");
    }

    #[test]
    fn test_reply_to_is_omitted_when_absent() {
        let mail = OutgoingMail {
            from: "a <a@x>".to_string(),
            to: "b <b@x>".to_string(),
            reply_to: None,
            subject: "s".to_string(),
            text: "t".to_string(),
        };

        let body = serde_json::to_value(&mail).expect("serialize");
        assert!(body.get("reply_to").is_none());
    }
}
