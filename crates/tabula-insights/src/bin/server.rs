//! Server entry point for the insight API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tabula_insights::server::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig, run_server};
use tabula_insights::{Pipeline, PipelineConfig};
use tracing::{info, warn};

#[cfg(feature = "ai")]
use std::env;
#[cfg(feature = "ai")]
use tabula_insights::GeminiProvider;

#[derive(Parser, Debug)]
#[command(
    name = "tabula-server",
    version,
    about = "HTTP server for the CSV insight pipeline",
    long_about = "Serves CSV analysis and report management over HTTP.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Gemini (enables model-written summaries)\n\n\
                  EXAMPLES:\n  \
                  # Serve on the default address (127.0.0.1:8000)\n  \
                  tabula-server\n\n  \
                  # Public bind with a custom report directory\n  \
                  tabula-server --host 0.0.0.0 -p 9000 -r reports/"
)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory holding the generated reports
    #[arg(short = 'r', long, default_value = "output")]
    reports_dir: String,

    /// Maximum upload size in mebibytes
    #[arg(long, default_value_t = 50)]
    upload_limit_mb: usize,

    /// Disable the language model (summaries fall back to raw statistics)
    #[arg(long)]
    no_ai: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress startup output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    dotenv().ok();

    let config = PipelineConfig::builder()
        .reports_dir(&args.reports_dir)
        .use_language_model(!args.no_ai)
        .build()?;

    let pipeline = Arc::new(build_pipeline(&args, config)?);

    let server_config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        upload_limit_bytes: args.upload_limit_mb * 1024 * 1024,
    };

    info!("Reports directory: {}", args.reports_dir);

    run_server(server_config, pipeline).await?;

    Ok(())
}

/// Build the pipeline with optional Gemini support
#[cfg(feature = "ai")]
fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    if args.no_ai {
        info!("Language model disabled (--no-ai)");
        return Ok(Pipeline::builder().config(config).build()?);
    }

    let api_key = env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        warn!("GEMINI_API_KEY not set. Summaries fall back to raw statistics.");
        String::new()
    });

    if api_key.is_empty() {
        return Ok(Pipeline::builder().config(config).build()?);
    }

    info!("Summarizing with Gemini");
    let provider = Arc::new(GeminiProvider::new(api_key)?);

    Ok(Pipeline::builder()
        .config(config)
        .llm_provider(provider)
        .build()?)
}

/// Build the pipeline without model support (fallback when "ai" is disabled)
#[cfg(not(feature = "ai"))]
fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    if !args.no_ai {
        warn!("Model support not compiled in. Summaries fall back to raw statistics.");
        warn!("Compile with --features ai to enable Gemini summaries.");
    }

    Ok(Pipeline::builder().config(config).build()?)
}
