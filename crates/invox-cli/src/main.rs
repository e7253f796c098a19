//! Invox - invoice field extraction from images with an Ollama vision model

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use invox_core::{OllamaConfig, VisionClient};

/// Extract structured invoice fields from an image.
#[derive(Parser)]
#[command(name = "invox", version, about)]
struct Args {
    /// Path to the invoice image
    image: PathBuf,

    /// Base URL of the Ollama server
    #[arg(long, default_value = "http://localhost:11434")]
    endpoint: String,

    /// Vision model to run
    #[arg(long, default_value = "llama3.2-vision")]
    model: String,

    /// Print the record as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Suppress streaming progress output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let encoded = BASE64.encode(&bytes);
    info!(
        model = %args.model,
        image_bytes = bytes.len(),
        "starting extraction"
    );

    let config = OllamaConfig {
        base_url: args.endpoint,
        model: args.model,
        ..OllamaConfig::default()
    };
    let client = VisionClient::new(config);

    let show_progress = !args.quiet && std::io::stderr().is_terminal();
    let mut observer = move |text: &str| {
        if show_progress {
            eprint!("\rreceived {} chars", text.chars().count());
            let _ = std::io::stderr().flush();
        }
    };

    let record = client
        .process_image_with_progress(&encoded, &mut observer)
        .await?;
    if show_progress {
        eprintln!();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        for (label, value) in record.fields() {
            println!("{label:<22} {}", value.unwrap_or("not available"));
        }
    }

    Ok(())
}
