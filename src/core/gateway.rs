//! Boundary to the translation model

use async_trait::async_trait;

use crate::core::errors::Result;
use crate::core::models::{LanguageTag, TranslationOutcome};

/// A translation backend.
///
/// `translate_many` returns one outcome per input, in input order. A failed
/// item is reported as [`TranslationOutcome::Failed`] at its position; `Err`
/// means the whole group failed.
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Backend identifier for logs and the info endpoint
    fn name(&self) -> &str;

    /// Translate a single text
    async fn translate_one(
        &self,
        text: &str,
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<String>;

    /// Translate a group of texts in one model call
    async fn translate_many(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<TranslationOutcome>>;
}
