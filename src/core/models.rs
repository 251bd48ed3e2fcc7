//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::errors::TranslationError;

/// Languages supported by the mBART-50 backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    /// `en_XX`
    English,
    /// `hi_IN`
    Hindi,
    /// `ta_IN`
    Tamil,
    /// `ml_IN`
    Malayalam,
    /// `te_IN`
    Telugu,
}

impl LanguageTag {
    /// Every supported language, in display order
    pub const ALL: [LanguageTag; 5] = [
        LanguageTag::English,
        LanguageTag::Hindi,
        LanguageTag::Tamil,
        LanguageTag::Malayalam,
        LanguageTag::Telugu,
    ];

    /// Lowercase language name as accepted by the API
    pub fn name(&self) -> &'static str {
        match self {
            LanguageTag::English => "english",
            LanguageTag::Hindi => "hindi",
            LanguageTag::Tamil => "tamil",
            LanguageTag::Malayalam => "malayalam",
            LanguageTag::Telugu => "telugu",
        }
    }

    /// Language code understood by the model tokenizer
    pub fn model_code(&self) -> &'static str {
        match self {
            LanguageTag::English => "en_XX",
            LanguageTag::Hindi => "hi_IN",
            LanguageTag::Tamil => "ta_IN",
            LanguageTag::Malayalam => "ml_IN",
            LanguageTag::Telugu => "te_IN",
        }
    }

    /// Comma separated list of supported names, for error messages
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanguageTag {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.name() == normalized)
            .ok_or_else(|| TranslationError::UnsupportedLanguage {
                language: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}

/// Per-item result of a batch translation, aligned with its input position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// The item was translated
    Translated {
        /// Translated text
        translation: String,
    },
    /// The item could not be translated; other positions are unaffected
    Failed {
        /// Failure reason
        error: String,
    },
}

impl TranslationOutcome {
    /// Successful outcome
    pub fn translated(text: impl Into<String>) -> Self {
        TranslationOutcome::Translated {
            translation: text.into(),
        }
    }

    /// Failure marker carrying the reason
    pub fn failed(error: impl Into<String>) -> Self {
        TranslationOutcome::Failed {
            error: error.into(),
        }
    }

    /// Whether the item was translated
    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated { .. })
    }

    /// Translated text, if any
    pub fn translation(&self) -> Option<&str> {
        match self {
            TranslationOutcome::Translated { translation } => Some(translation),
            TranslationOutcome::Failed { .. } => None,
        }
    }
}

/// How a request was routed through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Single model call on the whole text
    Direct,
    /// Text split into overlapping windows, translated and rejoined
    Chunked,
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationMode::Direct => write!(f, "direct"),
            TranslationMode::Chunked => write!(f, "chunked"),
        }
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Language of `text`
    pub source: LanguageTag,
    /// Language to translate into
    pub target: LanguageTag,
}

impl TranslationRequest {
    /// English source, the service default
    pub fn new(text: impl Into<String>, target: LanguageTag) -> Self {
        Self {
            text: text.into(),
            source: LanguageTag::English,
            target,
        }
    }

    /// Override the source language
    pub fn with_source(mut self, source: LanguageTag) -> Self {
        self.source = source;
        self
    }
}

/// Translation response
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    /// Translated text
    pub translation: String,
    /// Source language
    pub source: LanguageTag,
    /// Target language
    pub target: LanguageTag,
    /// Path the request took
    pub mode: TranslationMode,
    /// Number of windows sent to the model, 1 in direct mode
    pub chunks: usize,
    /// Wall time spent translating
    pub elapsed: Duration,
}

/// Batch translation response
#[derive(Debug, Clone)]
pub struct BatchResponse {
    /// One outcome per input text, in input order
    pub outcomes: Vec<TranslationOutcome>,
    /// Source language
    pub source: LanguageTag,
    /// Target language
    pub target: LanguageTag,
    /// Wall time spent translating
    pub elapsed: Duration,
}

impl BatchResponse {
    /// Number of items that failed
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_translated()).count()
    }
}

/// Format a duration the way the API reports processing time
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing_is_case_insensitive() {
        assert_eq!("HINDI".parse::<LanguageTag>().unwrap(), LanguageTag::Hindi);
        assert_eq!("hindi".parse::<LanguageTag>().unwrap(), LanguageTag::Hindi);
        assert_eq!(" Tamil ".parse::<LanguageTag>().unwrap(), LanguageTag::Tamil);
    }

    #[test]
    fn test_unsupported_language() {
        let err = "french".parse::<LanguageTag>().unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLanguage { .. }));
        assert!(err.to_string().contains("malayalam"));
    }

    #[test]
    fn test_model_codes() {
        assert_eq!(LanguageTag::English.model_code(), "en_XX");
        assert_eq!(LanguageTag::Hindi.model_code(), "hi_IN");
        assert_eq!(LanguageTag::Tamil.model_code(), "ta_IN");
        assert_eq!(LanguageTag::Malayalam.model_code(), "ml_IN");
        assert_eq!(LanguageTag::Telugu.model_code(), "te_IN");
    }

    #[test]
    fn test_outcome_serialization() {
        let ok = serde_json::to_value(TranslationOutcome::translated("नमस्ते")).unwrap();
        assert_eq!(ok["status"], "translated");
        assert_eq!(ok["translation"], "नमस्ते");

        let failed = serde_json::to_value(TranslationOutcome::failed("boom")).unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["error"], "boom");
        assert!(failed.get("translation").is_none());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.23 seconds");
        assert_eq!(format_elapsed(Duration::ZERO), "0.00 seconds");
    }
}
