use anyhow::Result;
use clap::Parser;
use extract::{GeminiClient, TokioDelay};
use pan_extract::{
    AppConfig, Orchestrator, PipelineError, RunReport, WriteSummary, api_key_from_env, load_env_file,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Extract PAN-to-entity relations from a PDF into a CSV file
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// PDF to read (default: toext.pdf)
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV file to write (default: result.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML file overriding the built-in settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    println!("{}", "=".repeat(60));
    println!("PDF Entity Extractor with Smart Retry");
    println!("{}", "=".repeat(60));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        config.paths.input = input;
    }
    if let Some(output) = cli.output {
        config.paths.output = output;
    }

    // The key may already be exported
    if let Err(e) = load_env_file(Path::new(".env")) {
        warn!(error = %e, "Ignoring unreadable .env file");
    }
    let api_key = match api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            println!("\n❌ Error: {}", e);
            return Err(e.into());
        }
    };

    let provider = GeminiClient::new(
        config.models.api_base_url.clone(),
        api_key,
        config.request_timeout(),
    )?;
    let orchestrator = Orchestrator::new(config, Arc::new(provider), Arc::new(TokioDelay));

    match orchestrator.run().await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            print_failure(&e);
            Err(e.into())
        }
    }
}

fn print_report(report: &RunReport) {
    if let Some(model) = &report.extraction.model {
        println!("\nModel used: {}", model);
    }
    if report.extraction.partial {
        println!("⚠️  Rate limit hit before every chunk was processed; results are partial.");
    }

    match report.output {
        WriteSummary::Written(count) => {
            println!("✓ Wrote {} records to {}", count, report.output_path.display());
        }
        WriteSummary::Skipped => {
            println!("\nNo PAN-entity pairs found in the document; nothing written.");
        }
    }

    let metrics = &report.metrics;
    println!(
        "  Chunks: {} ({} requests across {} models)",
        metrics.chunks_total, metrics.chunks_processed, metrics.models_tried
    );
    println!(
        "  Records extracted: {} (including results discarded on model fallback)",
        metrics.records_extracted
    );
    println!(
        "  Elapsed: {:.1}s ({:.1}s in extraction)",
        metrics.elapsed.as_secs_f64(),
        metrics.extract_time.as_secs_f64()
    );

    println!("\n{}", "=".repeat(60));
    println!("✓ Process completed!");
    println!("{}", "=".repeat(60));
}

fn print_failure(error: &PipelineError) {
    match error {
        PipelineError::Input(_) => {
            println!("\n❌ {}", error);
            println!("Could not extract text from PDF. Aborting.");
        }
        PipelineError::CatalogUnavailable | PipelineError::AllModelsExhausted { .. } => {
            println!("\n❌ Entity extraction failed: {}", error);
            println!("\nSuggestions:");
            println!("  1. Wait a few minutes and try again");
            println!("  2. Check your quota: https://ai.dev/usage");
            println!("  3. Consider upgrading to paid tier for higher limits");
        }
        _ => println!("\n❌ {}", error),
    }
}
