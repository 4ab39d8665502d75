//! Support and contact mail endpoints.
//!
//! Both forward form submissions to the configured mail provider, addressed
//! to the stored operations mailbox, with reply-to pointing back at the
//! person who wrote in.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{AppState, CurrentSession};
use crate::error::{ServiceError, ServiceResult};
use crate::providers::{MailClient, OutgoingMail};

/// Request body for POST /api/mail/support
#[derive(Debug, Deserialize)]
pub struct SupportMailRequest {
    pub subject: String,
    pub message: String,
}

/// Request body for POST /api/mail/contact
#[derive(Debug, Deserialize)]
pub struct ContactMailRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Acknowledgement returned for accepted sends
#[derive(Debug, Serialize)]
pub struct MailSentResponse {
    pub success: bool,
    pub message: String,
}

fn require_field(value: &str, name: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: format!("{name} is required"),
        });
    }
    Ok(())
}

async fn deliver(
    state: &AppState,
    reply_to: String,
    subject: String,
    text: String,
    kind: &'static str,
) -> ServiceResult<String> {
    let site = state.store.site()?;
    let mail = state.store.mail()?;

    let client = MailClient::new(&mail.api_key, &state.endpoints.mail, state.probe_timeout)?;
    let sent = client
        .send(&OutgoingMail {
            from: format!("{} <{}>", site.name, mail.from_email),
            to: format!("{} <{}>", mail.to_name, mail.to_email),
            reply_to: Some(reply_to),
            subject,
            text,
        })
        .await?;

    metrics::counter!("threadloom_mail_sends_total", "kind" => kind).increment(1);
    Ok(sent.id)
}

/// POST /api/mail/support - authenticated support request
pub async fn send_support_mail_handler(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(request): Json<SupportMailRequest>,
) -> ServiceResult<Json<MailSentResponse>> {
    let caller = session.as_ref().ok_or(ServiceError::Unauthorized)?;
    require_field(&request.subject, "subject")?;
    require_field(&request.message, "message")?;

    let reply_to = format!("{} <{}>", caller.name, caller.email);
    let id = deliver(&state, reply_to, request.subject, request.message, "support").await?;

    Ok(Json(MailSentResponse {
        success: true,
        message: format!("Support email sent successfully. Reference ID: {id}"),
    }))
}

/// POST /api/mail/contact - public contact form
pub async fn send_contact_mail_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactMailRequest>,
) -> ServiceResult<Json<MailSentResponse>> {
    require_field(&request.name, "name")?;
    require_field(&request.subject, "subject")?;
    require_field(&request.message, "message")?;
    if !request.email.contains('@') {
        return Err(ServiceError::InvalidRequest {
            message: "a valid email is required".to_string(),
        });
    }

    let reply_to = format!("{} <{}>", request.name, request.email);
    let id = deliver(&state, reply_to, request.subject, request.message, "contact").await?;

    Ok(Json(MailSentResponse {
        success: true,
        message: format!("Contact email sent successfully. Reference ID: {id}"),
    }))
}
