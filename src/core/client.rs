//! HTTP gateway to a model server hosting mBART-50, with retry logic
//!
//! Speaks the Hugging Face inference API translation format: the request
//! carries `inputs` plus `src_lang`/`tgt_lang` parameters and the response is
//! a list of `{"translation_text": ...}` objects aligned with the inputs.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::gateway::TranslationGateway;
use crate::core::models::{LanguageTag, TranslationOutcome};

/// One generated sequence in the model server response
#[derive(Debug, Deserialize)]
struct GeneratedTranslation {
    translation_text: Option<String>,
}

/// Async model server client with retry and backoff
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    model_name: String,
    max_length: usize,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpGateway {
    /// Create a gateway from the service configuration
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        if config.model_endpoint.is_empty() {
            return Err(TranslationError::ConfigError {
                message: "Model endpoint is required".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.model_endpoint.clone(),
            api_token: config.api_token.clone(),
            model_name: config.model_name.clone(),
            max_length: config.max_length,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    fn request_body(
        &self,
        inputs: serde_json::Value,
        source: LanguageTag,
        target: LanguageTag,
    ) -> serde_json::Value {
        serde_json::json!({
            "inputs": inputs,
            "parameters": {
                "src_lang": source.model_code(),
                "tgt_lang": target.model_code(),
                "max_length": self.max_length,
            },
            "options": {
                "wait_for_model": true
            }
        })
    }

    /// Send with retries, backing off exponentially between attempts
    async fn generate(&self, body: &serde_json::Value) -> Result<Vec<GeneratedTranslation>> {
        let mut last_error: Option<TranslationError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt, last_error.as_ref());
                debug!("Retry attempt {} against {} in {:?}", attempt, self.endpoint, delay);
                sleep(delay).await;
            }

            match self.send_request(body).await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Successfully translated after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    warn!("Model request failed (attempt {}): {}", attempt + 1, e);
                    let retryable = is_retryable(&e);
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(match last_error {
            Some(TranslationError::ApiError { status: 503, message }) => {
                TranslationError::BackendUnavailable { message }
            }
            Some(e) => e,
            None => TranslationError::InternalError("no request attempted".to_string()),
        })
    }

    /// Exponential backoff, stretched to the server's `Retry-After` when rate limited
    fn retry_delay(&self, attempt: u32, last_error: Option<&TranslationError>) -> Duration {
        let backoff = Duration::from_millis(
            self.retry_delay_ms.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1))),
        );
        match last_error {
            Some(TranslationError::RateLimitError {
                retry_after: Some(secs),
            }) => backoff.max(Duration::from_secs(*secs)),
            _ => backoff,
        }
    }

    /// Send actual HTTP request
    async fn send_request(&self, body: &serde_json::Value) -> Result<Vec<GeneratedTranslation>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(body);

        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                TranslationError::BackendUnavailable {
                    message: e.to_string(),
                }
            } else if e.is_timeout() {
                TranslationError::TimeoutError
            } else {
                TranslationError::NetworkError {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<Vec<GeneratedTranslation>>()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                });
        }

        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let error_text = response.text().await.unwrap_or_default();

        if status_code == 429 {
            return Err(TranslationError::RateLimitError { retry_after });
        }

        Err(TranslationError::ApiError {
            status: status_code,
            message: error_message(&error_text),
        })
    }
}

/// Client errors other than rate limiting will fail the same way again
fn is_retryable(error: &TranslationError) -> bool {
    match error {
        TranslationError::ApiError { status, .. } => *status >= 500,
        TranslationError::InvalidResponseError { .. } => false,
        _ => true,
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl TranslationGateway for HttpGateway {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn translate_one(
        &self,
        text: &str,
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<String> {
        let body = self.request_body(serde_json::json!(text), source, target);
        let generated = self.generate(&body).await?;

        generated
            .into_iter()
            .next()
            .and_then(|g| g.translation_text)
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No translation in response".to_string(),
            })
    }

    async fn translate_many(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<TranslationOutcome>> {
        let body = self.request_body(serde_json::json!(texts), source, target);
        let generated = self.generate(&body).await?;

        if generated.len() != texts.len() {
            return Err(TranslationError::InvalidResponseError {
                message: format!(
                    "expected {} translations, got {}",
                    texts.len(),
                    generated.len()
                ),
            });
        }

        Ok(generated
            .into_iter()
            .map(|g| match g.translation_text {
                Some(text) => TranslationOutcome::translated(text),
                None => TranslationOutcome::failed("No translation in response"),
            })
            .collect())
    }
}
