//! Request-level translation: routing between a direct model call and the
//! chunk, batch, rejoin path for long texts.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::core::chunker::Chunker;
use crate::core::client::HttpGateway;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::gateway::TranslationGateway;
use crate::core::models::{
    BatchResponse, LanguageTag, TranslationMode, TranslationOutcome, TranslationRequest,
    TranslationResponse,
};
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::reassembler;
use crate::core::text::char_len;

/// Translation service shared by every request handler
#[derive(Clone)]
pub struct TranslationService {
    gateway: Arc<dyn TranslationGateway>,
    chunker: Chunker,
    batch_size: usize,
    chunk_threshold: usize,
    permits: Arc<Semaphore>,
}

impl TranslationService {
    /// Create a service around an already constructed gateway
    pub fn new(gateway: Arc<dyn TranslationGateway>, config: &TranslatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        Ok(Self {
            gateway,
            chunker: Chunker::new(config.chunker_config())?,
            batch_size: config.batch_size,
            chunk_threshold: config.chunk_threshold,
            permits: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Create a service backed by the HTTP model server described in `config`
    pub fn with_http_backend(config: &TranslatorConfig) -> Result<Self> {
        let gateway = HttpGateway::new(config)?;
        info!("Using translation backend {}", gateway.name());
        Self::new(Arc::new(gateway), config)
    }

    /// Name of the backend in use
    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Texts longer than the threshold take the chunked path
    pub fn route(&self, text: &str) -> TranslationMode {
        if char_len(text) > self.chunk_threshold {
            TranslationMode::Chunked
        } else {
            TranslationMode::Direct
        }
    }

    /// Translate a single text.
    ///
    /// In chunked mode any window that fails to translate fails the whole
    /// request; a partially translated text is never returned.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        if request.text.trim().is_empty() {
            return Err(TranslationError::MissingField {
                field: "text".to_string(),
            });
        }
        check_languages(request.source, request.target)?;

        let start = Instant::now();
        let mode = self.route(&request.text);
        let _permit = self.acquire().await?;

        let (translation, chunks) = match mode {
            TranslationMode::Direct => {
                let translation = self
                    .gateway
                    .translate_one(&request.text, request.source, request.target)
                    .await?;
                (translation, 1)
            }
            TranslationMode::Chunked => self.translate_chunked(request).await?,
        };

        let elapsed = start.elapsed();
        info!(
            "Translated {} chars {} -> {} ({} mode, {} chunks) in {:?}",
            char_len(&request.text),
            request.source,
            request.target,
            mode,
            chunks,
            elapsed
        );

        Ok(TranslationResponse {
            translation,
            source: request.source,
            target: request.target,
            mode,
            chunks,
            elapsed,
        })
    }

    async fn translate_chunked(&self, request: &TranslationRequest) -> Result<(String, usize)> {
        let chunks = self.chunker.split(&request.text);
        info!("Split large text into {} chunks", chunks.len());

        let items: Vec<String> = chunks.iter().map(|c| c.text.to_string()).collect();
        let outcomes = BatchOrchestrator::new(self.gateway.as_ref(), self.batch_size)?
            .translate_batch(&items, request.source, request.target)
            .await?;

        let mut translated = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                TranslationOutcome::Translated { translation } => translated.push(translation),
                TranslationOutcome::Failed { error } => {
                    warn!("Chunk {} failed: {}", index, error);
                    return Err(TranslationError::ChunkFailed {
                        index,
                        message: error,
                    });
                }
            }
        }

        Ok((reassembler::join(&translated), chunks.len()))
    }

    /// Translate many independent texts, one outcome per text
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<BatchResponse> {
        self.translate_batch_with_progress(texts, source, target, |_, _| {})
            .await
    }

    /// Batch translation reporting `(groups_done, groups_total)` after each group
    pub async fn translate_batch_with_progress<F>(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
        on_group: F,
    ) -> Result<BatchResponse>
    where
        F: FnMut(usize, usize) + Send,
    {
        if texts.is_empty() {
            return Err(TranslationError::MissingField {
                field: "texts".to_string(),
            });
        }
        check_languages(source, target)?;

        let start = Instant::now();
        let _permit = self.acquire().await?;

        let outcomes = BatchOrchestrator::new(self.gateway.as_ref(), self.batch_size)?
            .translate_batch_with_progress(texts, source, target, on_group)
            .await?;

        let response = BatchResponse {
            outcomes,
            source,
            target,
            elapsed: start.elapsed(),
        };

        info!(
            "Translated batch of {} texts {} -> {} ({} failed) in {:?}",
            texts.len(),
            source,
            target,
            response.failed_count(),
            response.elapsed
        );

        Ok(response)
    }

    /// Serialize access to the gateway
    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        debug!("Waiting for gateway permit");
        self.permits
            .acquire()
            .await
            .map_err(|e| TranslationError::InternalError(e.to_string()))
    }
}

fn check_languages(source: LanguageTag, target: LanguageTag) -> Result<()> {
    if source == target {
        return Err(TranslationError::Validation {
            message: format!("source and target language are both {}", source),
        });
    }
    Ok(())
}
