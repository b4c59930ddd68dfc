//! AI capability interface and text heuristics.
//!
//! Completion backends implement [`CompletionClient`]; the one to use is
//! chosen from [`AiConfig`] by [`create_client`]. The heuristics at the
//! bottom (relevance score and summary) are local and deterministic.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{LegacoreError, LegacoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Mock,
    Openai,
    Anthropic,
    Custom,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// Artificial latency of the mock client, in milliseconds.
    pub mock_latency_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Mock,
            mock_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub model: Option<String>,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate_completion(&self, prompt: &Prompt) -> LegacoreResult<Completion>;

    /// Completion delivered incrementally as text chunks.
    fn generate_stream(&self, prompt: &Prompt) -> BoxStream<'static, LegacoreResult<String>>;
}

/// Canned responses for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionClient {
    latency: Duration,
}

impl MockCompletionClient {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn response_for(prompt: &Prompt) -> String {
        format!("Mock AI Response for: {}", prompt.user)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn generate_completion(&self, prompt: &Prompt) -> LegacoreResult<Completion> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(Completion {
            content: Self::response_for(prompt),
            usage: Some(TokenUsage {
                prompt_tokens: 50,
                completion_tokens: 100,
                total_tokens: 150,
            }),
            model: Some("mock-model".into()),
        })
    }

    fn generate_stream(&self, prompt: &Prompt) -> BoxStream<'static, LegacoreResult<String>> {
        let words: Vec<String> = Self::response_for(prompt)
            .split(' ')
            .map(|w| format!("{w} "))
            .collect();
        let latency = self.latency;
        stream::iter(words)
            .then(move |word| async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency / 10).await;
                }
                Ok(word)
            })
            .boxed()
    }
}

/// Build the completion client selected by `config.provider`.
///
/// Only the mock backend ships with this build; other providers are
/// reported as an unavailable external service.
pub fn create_client(config: &AiConfig) -> LegacoreResult<Box<dyn CompletionClient>> {
    match config.provider {
        AiProvider::Mock => Ok(Box::new(MockCompletionClient::new(Duration::from_millis(
            config.mock_latency_ms,
        )))),
        other => Err(LegacoreError::ExternalService {
            service: other.as_str().into(),
            message: "provider is not available in this build".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// Keywords that drive contract opportunity scoring.
pub const OPPORTUNITY_KEYWORDS: &[&str] = &["AI", "ML", "cloud", "cybersecurity", "data", "analytics"];

pub const SUMMARY_MAX_LEN: usize = 200;

/// Percentage of `criteria` found (case-insensitively) in `content`,
/// rounded to the nearest integer. Always in `[0, 100]`.
pub fn score_relevance(content: &str, criteria: &[&str]) -> f64 {
    if criteria.is_empty() {
        return 0.0;
    }
    let lower = content.to_lowercase();
    let matched = criteria
        .iter()
        .filter(|c| lower.contains(&c.to_lowercase()))
        .count();
    (matched as f64 / criteria.len() as f64 * 100.0).round()
}

/// Truncate to `max_len` characters, ending with `...` when cut.
pub fn summarize(content: &str, max_len: usize) -> String {
    if content.chars().count() <= max_len {
        return content.to_string();
    }
    let kept: String = content.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_counts_matched_keywords() {
        let text = "Cloud migration with cybersecurity and data analytics";
        // cloud, cybersecurity, data, analytics = 4 of 6
        assert_eq!(score_relevance(text, OPPORTUNITY_KEYWORDS), 67.0);
        assert_eq!(score_relevance("", OPPORTUNITY_KEYWORDS), 0.0);
        assert_eq!(score_relevance("anything", &[]), 0.0);
    }

    #[test]
    fn relevance_is_bounded() {
        let all = OPPORTUNITY_KEYWORDS.join(" ");
        assert_eq!(score_relevance(&all, OPPORTUNITY_KEYWORDS), 100.0);
    }

    #[test]
    fn summary_truncates_with_ellipsis() {
        assert_eq!(summarize("short", 200), "short");
        let long = "x".repeat(250);
        let summary = summarize(&long, 200);
        assert_eq!(summary.chars().count(), 200);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn mock_client_completes_and_streams() {
        let client = create_client(&AiConfig::default()).unwrap();
        let prompt = Prompt {
            user: "hello there".into(),
            ..Default::default()
        };

        let completion = client.generate_completion(&prompt).await.unwrap();
        assert_eq!(completion.content, "Mock AI Response for: hello there");
        assert_eq!(completion.usage.unwrap().total_tokens, 150);

        let chunks: Vec<String> = client
            .generate_stream(&prompt)
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.concat().trim_end(), completion.content);
    }

    #[test]
    fn unavailable_provider_is_external_failure() {
        let config = AiConfig {
            provider: AiProvider::Anthropic,
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert_eq!(err.status_code(), 503);
    }
}
