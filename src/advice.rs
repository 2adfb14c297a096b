// src/advice.rs
use crate::config::Config;
use crate::model::WorkoutLog;
use crate::stats::recent_summary_text;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const MISSING_KEY_MESSAGE: &str = "請先設定 API Key 以使用 AI 教練功能。";
pub const EMPTY_RESPONSE_MESSAGE: &str = "無法產生建議，請稍後再試。";
pub const CONNECTION_ERROR_MESSAGE: &str = "AI 連線發生錯誤，請檢查網路或 API Key。";

const NO_HISTORY: &str = "No recent history.";

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Whether a credential is available. Checked before any call is made.
    fn is_configured(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Coaching prompt for `current_date` around the digest of the last
/// `max_days` logged dates.
pub fn build_prompt(current_date: &str, history: &str, max_days: usize) -> String {
    let history = if history.trim().is_empty() {
        NO_HISTORY
    } else {
        history
    };
    format!(
        "You are an encouraging and knowledgeable fitness coach for a beginner.

Current Date: {current_date}

User's Recent Activity (Last {max_days} days):
{history}

Task:
1. Briefly analyze their recent consistency and volume.
2. Suggest a specific focus or a few exercises for today based on what they HAVEN'T done recently (muscle balance).
3. Keep it short, motivating, and under 150 words.
4. Use Traditional Chinese (zh-TW).
"
    )
}

/// Asks `generator` for coaching text. The returned future never fails: a
/// missing credential, an empty answer or a failed call each resolve to a
/// fixed message.
///
/// The prompt is built from `log` before this returns and the future owns
/// it, so the caller may keep changing the log while the request runs.
pub fn request_advice(
    generator: Arc<dyn TextGenerator>,
    log: &WorkoutLog,
    current_date: &str,
    max_days: usize,
) -> impl Future<Output = String> + Send + 'static {
    let prompt = generator.is_configured().then(|| {
        build_prompt(
            current_date,
            &recent_summary_text(log, max_days),
            max_days,
        )
    });

    async move {
        let Some(prompt) = prompt else {
            warn!("No API key configured, skipping advice request");
            return MISSING_KEY_MESSAGE.to_string();
        };
        debug!("Advice prompt: {prompt}");

        match generator.generate(&prompt).await {
            Ok(text) if text.is_empty() => {
                warn!("Text generation returned no text");
                EMPTY_RESPONSE_MESSAGE.to_string()
            }
            Ok(text) => {
                info!("Received advice ({} chars)", text.chars().count());
                text
            }
            Err(e) => {
                error!("Advice request failed: {e:#}");
                CONNECTION_ERROR_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http_client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.resolved_api_key(),
            config.model.clone(),
            config.api_base_url.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("Gemini API key is not configured");
        };
        let url = self.endpoint();
        info!("Sending generateContent request to {} (model {})", url, self.model);

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send generateContent request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            bail!("Gemini returned error: {} - {}", status, error_body);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to deserialize generateContent response")?;
        Ok(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_date_and_history() {
        let prompt = build_prompt(
            "2024-05-01",
            "Date: 2024-04-30 | Activities: Row: 3 sets (Best: 40kg)",
            7,
        );
        assert!(prompt.contains("Current Date: 2024-05-01"));
        assert!(prompt.contains("Recent Activity (Last 7 days):"));
        assert!(prompt.contains("Row: 3 sets (Best: 40kg)"));
        assert!(prompt.contains("under 150 words"));
        assert!(prompt.contains("Traditional Chinese (zh-TW)"));
    }

    #[test]
    fn test_prompt_without_history() {
        let prompt = build_prompt("2024-05-01", "", 7);
        assert!(prompt.contains(NO_HISTORY));
    }

    #[test]
    fn test_prompt_names_the_summary_window() {
        let prompt = build_prompt("2024-05-01", "", 3);
        assert!(prompt.contains("Recent Activity (Last 3 days):"));
        assert!(!prompt.contains("Last 7 days"));
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "Rest "}, {"text": "today."}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.text(), "Rest today.");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_client_without_key_is_not_configured() {
        let client = GeminiClient::new(None, "m".into(), "https://example.invalid/v1beta/".into());
        assert!(!client.is_configured());
        assert_eq!(
            client.endpoint(),
            "https://example.invalid/v1beta/models/m:generateContent"
        );
    }

    #[tokio::test]
    async fn test_client_without_key_refuses_to_call() {
        let client = GeminiClient::new(None, "m".into(), "https://example.invalid".into());
        assert!(client.generate("hi").await.is_err());
    }
}
