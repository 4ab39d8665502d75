//! AI-backed social thread generation.
//!
//! The generator asks the configured model for a fixed number of posts
//! separated by `---` lines, then splits the completion back into the
//! individual posts. The separator convention is part of the prompt, so
//! splitting and prompting must stay in agreement.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::EndpointsConfig;
use crate::error::{ProviderError, ServiceError, ServiceResult};
use crate::providers::AiClient;
use crate::settings::SettingsStore;

pub const MIN_THREAD_LENGTH: u8 = 2;
pub const MAX_THREAD_LENGTH: u8 = 20;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Twitter,
    Instagram,
    Linkedin,
    Youtube,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PostLength {
    Short,
    Medium,
    Long,
    XPro,
}

impl PostLength {
    fn guidance(&self) -> &'static str {
        match self {
            PostLength::Short => "1-2 sentences per post",
            PostLength::Medium => "2-4 sentences per post",
            PostLength::Long => "4-6 sentences per post",
            PostLength::XPro => "long-form posts of several paragraphs",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Informative,
    Engaging,
    Humorous,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRequest {
    pub topic: String,
    pub platform: Platform,
    pub thread_length: u8,
    pub post_length: PostLength,
    pub tone: Tone,
}

impl ThreadRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.topic.trim().is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "topic is required".to_string(),
            });
        }
        if self.thread_length < MIN_THREAD_LENGTH || self.thread_length > MAX_THREAD_LENGTH {
            return Err(ServiceError::InvalidRequest {
                message: format!(
                    "threadLength must be between {MIN_THREAD_LENGTH} and {MAX_THREAD_LENGTH}"
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub thread: Vec<String>,
    pub topic: String,
    pub platform: Platform,
    pub tone: Tone,
    pub total_posts: usize,
}

/// Split a completion into posts on separator lines of three or more dashes
pub fn split_thread(text: &str) -> Vec<String> {
    let mut posts = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
            flush_post(&mut posts, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    flush_post(&mut posts, &mut current);

    posts
}

fn flush_post(posts: &mut Vec<String>, current: &mut String) {
    let post = current.trim();
    if !post.is_empty() {
        posts.push(post.to_string());
    }
    current.clear();
}

fn build_prompt(request: &ThreadRequest) -> String {
    format!(
        "You are a social media content writer. Write a {platform} thread about the topic below.\n\
         \n\
         Topic: {topic}\n\
         \n\
         Requirements:\n\
         - Exactly {count} posts.\n\
         - Tone: {tone}.\n\
         - Length: {length}.\n\
         - Separate consecutive posts with a line containing only ---\n\
         - Output the posts only, with no numbering and no commentary.",
        platform = request.platform,
        topic = request.topic.trim(),
        count = request.thread_length,
        tone = request.tone,
        length = request.post_length.guidance(),
    )
}

/// Thread generation service over the configured AI provider
pub struct ThreadGenerator {
    store: SettingsStore,
    endpoints: EndpointsConfig,
    timeout: Duration,
}

impl ThreadGenerator {
    pub fn new(store: SettingsStore, endpoints: EndpointsConfig, timeout: Duration) -> Self {
        Self {
            store,
            endpoints,
            timeout,
        }
    }

    pub async fn generate(&self, request: &ThreadRequest) -> ServiceResult<ThreadResponse> {
        request.validate()?;

        let settings = self.store.ai()?;
        if settings.api_key.is_empty() {
            return Err(ProviderError::Unconfigured {
                provider: "AI gateway".to_string(),
                message: "no API key configured".to_string(),
            }
            .into());
        }

        let client = AiClient::from_settings(&settings, &self.endpoints.ai_gateway, self.timeout)?;
        let completion = client.complete(&build_prompt(request)).await?;
        let thread = split_thread(&completion.text);

        metrics::counter!("threadloom_threads_generated_total").increment(1);
        info!(
            platform = %request.platform,
            requested = request.thread_length,
            generated = thread.len(),
            "generated thread"
        );

        let total_posts = thread.len();
        Ok(ThreadResponse {
            thread,
            topic: request.topic.clone(),
            platform: request.platform,
            tone: request.tone,
            total_posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::settings::{AiSettings, SettingsDomain};
    use axum::Router;
    use axum::routing::post;
    use serde_json::json;
    use std::sync::Arc;

    fn request() -> ThreadRequest {
        ThreadRequest {
            topic: "Rust error handling".to_string(),
            platform: Platform::Twitter,
            thread_length: 3,
            post_length: PostLength::Medium,
            tone: Tone::Informative,
        }
    }

    #[test]
    fn test_split_on_dash_lines() {
        let text = "First post.\n---\nSecond post.\n-----\nThird post.";
        assert_eq!(
            split_thread(text),
            vec!["First post.", "Second post.", "Third post."]
        );
    }

    #[test]
    fn test_split_ignores_inline_dashes() {
        let text = "a---b\n---\nwell--spaced";
        assert_eq!(split_thread(text), vec!["a---b", "well--spaced"]);
    }

    #[test]
    fn test_split_trims_and_drops_empty_segments() {
        let text = "\n---\n  One  \n\n---\n---\nTwo\n---\n";
        assert_eq!(split_thread(text), vec!["One", "Two"]);
    }

    #[test]
    fn test_split_without_separator_is_single_post() {
        assert_eq!(split_thread("just one post"), vec!["just one post"]);
        assert!(split_thread("   \n  ").is_empty());
    }

    #[test]
    fn test_separator_line_may_carry_whitespace() {
        let text = "One\n  ---  \nTwo";
        assert_eq!(split_thread(text), vec!["One", "Two"]);
    }

    #[test]
    fn test_validate_bounds() {
        let mut req = request();
        req.thread_length = 1;
        assert!(req.validate().is_err());
        req.thread_length = 21;
        assert!(req.validate().is_err());
        req.thread_length = 2;
        assert!(req.validate().is_ok());
        req.thread_length = 20;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_topic() {
        let mut req = request();
        req.topic = "   ".to_string();
        match req.validate() {
            Err(ServiceError::InvalidRequest { message }) => {
                assert_eq!(message, "topic is required");
            }
            other => panic!("expected invalid request, got {other:?}"),
        }
    }

    #[test]
    fn test_request_wire_names() {
        let req: ThreadRequest = serde_json::from_value(json!({
            "topic": "growth",
            "platform": "linkedin",
            "threadLength": 5,
            "postLength": "x-pro",
            "tone": "engaging",
        }))
        .expect("deserialize");
        assert_eq!(req.platform, Platform::Linkedin);
        assert_eq!(req.post_length, PostLength::XPro);

        let bad: Result<ThreadRequest, _> = serde_json::from_value(json!({
            "topic": "growth",
            "platform": "myspace",
            "threadLength": 5,
            "postLength": "short",
            "tone": "engaging",
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_prompt_carries_request_parameters() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("twitter"));
        assert!(prompt.contains("Rust error handling"));
        assert!(prompt.contains("Exactly 3 posts"));
        assert!(prompt.contains("informative"));
    }

    fn test_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::open(&dir.path().join("test.db")).expect("open db");
        (dir, SettingsStore::new(Arc::new(db)))
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let (_dir, store) = test_store();
        store
            .update_domain(
                SettingsDomain::Ai,
                &AiSettings {
                    api_key: "sk-test".to_string(),
                    enabled_models: vec!["gpt-4o-mini".to_string()],
                },
            )
            .expect("seed ai");

        let stub = Router::new().route(
            "/chat/completions",
            post(|| async {
                axum::Json(json!({
                    "choices": [{ "message": { "content": "Post one\n---\nPost two\n---\nPost three" } }]
                }))
            }),
        );
        let base = spawn_stub(stub).await;

        let generator = ThreadGenerator::new(
            store,
            EndpointsConfig {
                ai_gateway: base,
                ..EndpointsConfig::default()
            },
            Duration::from_secs(2),
        );

        let response = generator.generate(&request()).await.expect("generate");
        assert_eq!(response.thread, vec!["Post one", "Post two", "Post three"]);
        assert_eq!(response.total_posts, 3);
        assert_eq!(response.topic, "Rust error handling");
        assert_eq!(response.platform, Platform::Twitter);
        assert_eq!(response.tone, Tone::Informative);
    }

    #[tokio::test]
    async fn test_generate_requires_api_key() {
        let (_dir, store) = test_store();
        store
            .update_domain(
                SettingsDomain::Ai,
                &AiSettings {
                    api_key: String::new(),
                    enabled_models: vec!["gpt-4o-mini".to_string()],
                },
            )
            .expect("seed ai");

        let generator = ThreadGenerator::new(
            store,
            EndpointsConfig::default(),
            Duration::from_secs(2),
        );

        match generator.generate(&request()).await {
            Err(ServiceError::Provider(ProviderError::Unconfigured { .. })) => {}
            other => panic!("expected unconfigured, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_request_before_any_call() {
        let (_dir, store) = test_store();

        let generator = ThreadGenerator::new(
            store,
            EndpointsConfig {
                ai_gateway: "http://127.0.0.1:1".to_string(),
                ..EndpointsConfig::default()
            },
            Duration::from_secs(2),
        );

        let mut req = request();
        req.thread_length = 50;
        match generator.generate(&req).await {
            Err(ServiceError::InvalidRequest { .. }) => {}
            other => panic!("expected invalid request, got {other:?}"),
        }
    }
}
