//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::{LanguageTag, TranslationOutcome};

/// Commands for the translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Serve {
        /// Bind address (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default from config: 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },

    /// Translate a text or a whole file
    Translate {
        /// Text to translate
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// File to translate
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Target language (hindi, tamil, malayalam, telugu)
        #[arg(short, long)]
        target: LanguageTag,

        /// Source language
        #[arg(long, default_value = "english")]
        source: LanguageTag,

        /// Write the translation to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Collapse whitespace before translating
        #[arg(long)]
        clean: bool,
    },

    /// Translate every non-empty line of a file
    Batch {
        /// Input file, one text per line
        #[arg(short, long)]
        file: PathBuf,

        /// Target language (hindi, tamil, malayalam, telugu)
        #[arg(short, long)]
        target: LanguageTag,

        /// Source language
        #[arg(long, default_value = "english")]
        source: LanguageTag,

        /// Output file (default: <file>_<target>.txt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported languages
    Languages,
}

/// Handle server command
pub async fn handle_serve(
    mut config: TranslatorConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Starting HTTP server on {}:{}", config.host, config.port);
    println!("🚀 Server starting on http://{}:{}", config.host, config.port);

    run_server(config).await
}

/// Handle single text or file translation
pub async fn handle_translate(
    config: TranslatorConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    target: LanguageTag,
    source: LanguageTag,
    output: Option<PathBuf>,
    clean: bool,
) -> anyhow::Result<()> {
    use crate::core::models::TranslationRequest;
    use crate::core::pipeline::TranslationService;
    use crate::core::text::{char_len, clean_text, preview};
    use tracing::info;

    let (text, from_file) = match (text, &file) {
        (Some(text), _) => (text, false),
        (None, Some(path)) => (read_input(path).await?, true),
        (None, None) => anyhow::bail!("Either --text or --file must be specified"),
    };
    let text = if clean { clean_text(&text) } else { text };

    info!("Translating {} chars from {} to {}", char_len(&text), source, target);

    let service = TranslationService::with_http_backend(&config)?;
    let request = TranslationRequest::new(text, target).with_source(source);
    let response = service.translate(&request).await?;

    info!(
        "Translation completed in {:.2} seconds ({} mode)",
        response.elapsed.as_secs_f64(),
        response.mode
    );

    let shown = if from_file {
        preview(&response.translation, 500)
    } else {
        response.translation.clone()
    };
    println!("\nTranslation:");
    println!("{}", "-".repeat(50));
    println!("{}", shown);
    println!("{}", "-".repeat(50));

    if let Some(output) = output {
        write_output(&output, &response.translation).await?;
        println!("Translation saved to: {}", output.display());
    }

    Ok(())
}

/// Handle line-by-line batch translation
pub async fn handle_batch(
    config: TranslatorConfig,
    file: PathBuf,
    target: LanguageTag,
    source: LanguageTag,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::pipeline::TranslationService;
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::info;

    let content = read_input(&file).await?;
    let texts = batch_lines(&content);
    if texts.is_empty() {
        anyhow::bail!("No text found in {}", file.display());
    }

    let output = output.unwrap_or_else(|| default_output(&file, target));

    info!("Batch translating {} lines from {}", texts.len(), file.display());

    let service = TranslationService::with_http_backend(&config)?;

    let pb = ProgressBar::new(texts.len().div_ceil(config.batch_size) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({eta})",
            )?
            .progress_chars("=>-"),
    );

    let response = service
        .translate_batch_with_progress(&texts, source, target, |done, _| {
            pb.set_position(done as u64)
        })
        .await?;

    pb.finish_with_message("Completed");

    write_output(&output, &render_outcomes(&response.outcomes)).await?;

    let failed = response.failed_count();
    println!("\n✅ Batch translation completed!");
    println!("   Translated: {}", response.outcomes.len() - failed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", response.elapsed);
    println!("   Output: {}", output.display());

    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    for language in LanguageTag::ALL {
        println!("{:<10} {}", language.name(), language.model_code());
    }
}

async fn read_input(path: &Path) -> Result<String, TranslationError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

async fn write_output(path: &Path, content: &str) -> Result<(), TranslationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TranslationError::FileError {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
        }
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Non-empty trimmed lines
fn batch_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// One line per outcome, failed lines marked so positions stay aligned with the input
fn render_outcomes(outcomes: &[TranslationOutcome]) -> String {
    let mut rendered = String::new();
    for outcome in outcomes {
        match outcome {
            TranslationOutcome::Translated { translation } => rendered.push_str(translation),
            TranslationOutcome::Failed { error } => {
                rendered.push_str("[translation failed: ");
                rendered.push_str(error);
                rendered.push(']');
            }
        }
        rendered.push('\n');
    }
    rendered
}

fn default_output(input: &Path, target: LanguageTag) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "translation".to_string());
    input.with_file_name(format!("{}_{}.txt", stem, target))
}
