//! Outbound clients for the configured third-party providers.
//!
//! Every client is transient: built from the credentials in the settings
//! store at the moment of the call, used once, and dropped. A credential
//! update therefore takes effect on the next call with no restart and no
//! cache to invalidate.

mod ai;
mod mail;
mod payment;
mod storage;

pub use ai::{AiClient, AiCompletion};
pub use mail::{MailClient, OutgoingMail, SentMail};
pub use payment::PaymentClient;
pub use storage::{StorageClient, StorageUsage};

use reqwest::Client;
use std::time::Duration;

use crate::error::ProviderError;

pub(crate) fn build_http_client(
    timeout: Duration,
    base_url: &str,
) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Connection {
            url: base_url.to_string(),
            source: e,
        })
}
