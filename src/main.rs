//! Main entry point for the Indic Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indic_translator::cli::commands::{self, Commands};
use indic_translator::TranslatorConfig;

/// Indic Translator - English to Indian language translation
#[derive(Parser, Debug)]
#[command(name = "indic-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (json, yaml or toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API token for the model server (optional, defaults to HF_API_TOKEN env var)
    #[arg(long, global = true)]
    api_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let debug = args.verbose || matches!(args.command, Some(Commands::Serve { debug: true, .. }));
    let log_level = if debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},tower_http={}",
                    env!("CARGO_CRATE_NAME"),
                    log_level,
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = TranslatorConfig::load(args.config.as_deref())?;

    // Override config with CLI args if provided
    if let Some(api_token) = args.api_token {
        config.api_token = Some(api_token);
    }

    config.validate()?;

    match args.command {
        Some(Commands::Serve { host, port, .. }) => {
            commands::handle_serve(config, host, port).await?;
        }
        Some(Commands::Translate {
            text,
            file,
            target,
            source,
            output,
            clean,
        }) => {
            commands::handle_translate(config, text, file, target, source, output, clean).await?;
        }
        Some(Commands::Batch {
            file,
            target,
            source,
            output,
        }) => {
            commands::handle_batch(config, file, target, source, output).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages();
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
