use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};

/// Static configuration that cannot be changed at runtime.
///
/// Everything editable from the console UI lives in the settings store;
/// this covers server binding, storage paths, and outbound endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default = "default_probe")]
    pub probe: ProbeConfig,

    #[serde(default = "default_threads")]
    pub threads: ThreadsConfig,

    #[serde(default = "default_endpoints")]
    pub endpoints: EndpointsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Service-level auth configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Optional bootstrap bearer token granting admin access without a
    /// session row. Intended for first-run provisioning and ops tooling.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// How often to sweep expired session rows, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub session_sweep_interval_secs: u64,
}

impl AuthConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            session_sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Connection probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound for a single probe round-trip, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Thread generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsConfig {
    /// Timeout for a full thread-generation completion, in seconds
    #[serde(default = "default_threads_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ThreadsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Base URLs for outbound providers. Overridable so probes can be pointed
/// at a local stub during tests.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_ai_gateway_url")]
    pub ai_gateway: String,

    #[serde(default = "default_mail_url")]
    pub mail: String,

    #[serde(default = "default_storage_url")]
    pub storage: String,

    #[serde(default = "default_stripe_url")]
    pub stripe: String,

    #[serde(default = "default_polar_url")]
    pub polar: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        default_endpoints()
    }
}

impl StaticConfig {
    /// Load static configuration from file and env vars
    pub fn load() -> ServiceResult<Self> {
        Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("THREADLOOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ServiceError::Config {
                message: format!("Failed to build config: {}", e),
            })?
            .try_deserialize()
            .map_err(|e| ServiceError::Config {
                message: format!("Failed to deserialize static config: {}", e),
            })
    }
}

// ==================== Default Value Functions ====================

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        data_dir: default_data_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_probe() -> ProbeConfig {
    ProbeConfig {
        timeout_secs: default_probe_timeout_secs(),
    }
}

fn default_probe_timeout_secs() -> u64 {
    8
}

fn default_threads() -> ThreadsConfig {
    ThreadsConfig {
        request_timeout_secs: default_threads_timeout_secs(),
    }
}

fn default_threads_timeout_secs() -> u64 {
    60
}

fn default_endpoints() -> EndpointsConfig {
    EndpointsConfig {
        ai_gateway: default_ai_gateway_url(),
        mail: default_mail_url(),
        storage: default_storage_url(),
        stripe: default_stripe_url(),
        polar: default_polar_url(),
    }
}

fn default_ai_gateway_url() -> String {
    "https://ai-gateway.vercel.sh/v1".to_string()
}

fn default_mail_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_storage_url() -> String {
    "https://api.uploadthing.com".to_string()
}

fn default_stripe_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_polar_url() -> String {
    "https://api.polar.sh".to_string()
}
