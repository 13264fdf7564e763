use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use docnav_core::config::GeminiConfig;
use docnav_core::Mode;

use crate::service::{AnswerError, AnswerService};

const SYSTEM_INSTRUCTION: &str = "You answer questions using only the provided document context. \
If the context is insufficient, state that explicitly. \
Cite every key claim in [doc_name|page|paragraph] format.";

pub struct GeminiAnswerService {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiAnswerService {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(&self, mode: Mode, question: &str, context: &str) -> serde_json::Value {
        let prompt = format!(
            "MODE: {}\nQUESTION:\n{question}\n\nDOCUMENT CONTEXT:\n{context}\n\n\
             Return: (1) a direct answer, (2) the supporting citations, \
             (3) any gaps in the provided context.",
            mode.as_str().to_uppercase(),
        );

        json!({
            "system_instruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
            },
        })
    }

    async fn generate(&self, body: &serde_json::Value, api_key: &str) -> Result<String, AnswerError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.config.model, api_key,
        );

        debug!("Gemini request to model={}", self.config.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnswerError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                AnswerError::Parse("missing candidates[0].content.parts[0].text".into())
            })?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl AnswerService for GeminiAnswerService {
    async fn answer(
        &self,
        mode: Mode,
        question: &str,
        context: &str,
    ) -> Result<String, AnswerError> {
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or(AnswerError::NotConfigured)?;

        let body = self.build_request_body(mode, question, context);

        let max_attempts = self.config.retry_max_attempts.max(1);
        let mut delay = self.config.retry_initial_delay_secs.max(0.0);
        let multiplier = self.config.retry_backoff_multiplier.max(1.0);
        let max_delay = self.config.retry_max_delay_secs.max(delay);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.generate(&body, &api_key).await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        return Ok("Model returned an empty response.".to_string());
                    }
                    return Ok(text);
                }
                Err(err) => {
                    if attempt >= max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    debug!(attempt, %err, "retrying Gemini request");
                    if delay > 0.0 {
                        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                        delay = (delay * multiplier).min(max_delay);
                    } else {
                        delay = 1.0;
                    }
                }
            }
        }
    }
}

/// Rate-limit and transient-availability errors are worth retrying;
/// anything else fails fast.
fn is_retryable(err: &AnswerError) -> bool {
    if let AnswerError::Api { status: 429, .. } = err {
        return true;
    }
    let text = err.to_string().to_lowercase();
    const SIGNALS: &[&str] = &[
        "429",
        "resource_exhausted",
        "rate limit",
        "rate-limit",
        "quota",
        "too many requests",
        "temporarily unavailable",
        "deadline exceeded",
    ];
    SIGNALS.iter().any(|s| text.contains(s))
}
