//! Indic Translator - English to Indian language translation service
//!
//! Wraps a pretrained mBART-50 model server. Long texts are split into
//! overlapping windows, translated in fixed-size batches and joined back in
//! order. The service is exposed over HTTP and on the command line.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    chunker::{Chunk, Chunker, ChunkerConfig},
    client::HttpGateway,
    config::TranslatorConfig,
    errors::TranslationError,
    gateway::TranslationGateway,
    models::{LanguageTag, TranslationMode, TranslationOutcome, TranslationRequest},
    orchestrator::BatchOrchestrator,
    pipeline::TranslationService,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
