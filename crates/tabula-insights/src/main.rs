//! CLI entry point for the CSV insight pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use tabula_insights::{Analysis, Pipeline, PipelineConfig, Report};
use tracing::{error, info, warn};

#[cfg(feature = "ai")]
use std::sync::Arc;
#[cfg(feature = "ai")]
use tabula_insights::GeminiProvider;

#[derive(Parser, Debug)]
#[command(
    name = "tabula",
    version,
    about = "CSV Insight Pipeline",
    long_about = "Runs a four-stage analysis over a CSV file and writes an HTML report.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Gemini (enables model-written summaries)\n  \
                  TABULA_DATASET    Default dataset when no path is given\n\n\
                  EXAMPLES:\n  \
                  # Analyze a CSV and write the report to ./output\n  \
                  tabula data/orders.csv\n\n  \
                  # Custom report directory\n  \
                  tabula data/orders.csv -o reports/\n\n  \
                  # Statistics-only summary (no model call)\n  \
                  tabula data/orders.csv --no-ai"
)]
struct Args {
    /// Path to the CSV file to analyze
    ///
    /// Falls back to the TABULA_DATASET environment variable.
    dataset: Option<String>,

    /// Output directory for the report and summary text
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Skip writing the HTML report
    #[arg(long)]
    no_report: bool,

    /// Disable the language model (summaries fall back to raw statistics)
    #[arg(long)]
    no_ai: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress the run summary (only show warnings and errors)
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

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    dotenv().ok();

    let mut config_builder = PipelineConfig::builder()
        .reports_dir(&args.output)
        .use_language_model(!args.no_ai)
        .save_reports(!args.no_report);
    if let Ok(default) = env::var("TABULA_DATASET") {
        config_builder = config_builder.default_dataset(default);
    }
    let config = config_builder.build()?;

    // Positional argument first, then the configured default
    let dataset = match args
        .dataset
        .as_deref()
        .map(PathBuf::from)
        .or_else(|| config.default_dataset.clone())
    {
        Some(path) => path,
        None => {
            eprintln!("Usage: tabula [OPTIONS] <DATASET>");
            eprintln!("Provide a CSV path or set the TABULA_DATASET environment variable.");
            std::process::exit(1);
        }
    };

    if !dataset.exists() {
        return Err(anyhow!("Dataset file not found: {}", dataset.display()));
    }

    let pipeline = build_pipeline(&args, config)?;

    run_pipeline(pipeline, &args, &dataset)
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

/// Run the pipeline and print results
fn run_pipeline(pipeline: Pipeline, args: &Args, dataset: &Path) -> Result<()> {
    let source_name = dataset
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");

    info!("{}", "=".repeat(80));
    info!("Starting CSV insight pipeline...");
    info!("{}", "=".repeat(80));

    let analysis = match pipeline.process(dataset, source_name) {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Pipeline failed: {e}");
            return Err(anyhow!("Pipeline failed: {e}"));
        }
    };

    let summary_path = write_summary_text(&analysis.report, &args.output)?;
    info!("Summary written to: {}", summary_path.display());

    if !args.quiet {
        print_run_summary(&analysis, dataset);
    }

    Ok(())
}

/// Write the plain-text summary next to the report.
fn write_summary_text(report: &Report, output_dir: &str) -> Result<PathBuf> {
    let text = report
        .summary_text
        .as_deref()
        .unwrap_or("No summary produced.");
    std::fs::create_dir_all(output_dir)?;
    let path = Path::new(output_dir).join("summary.txt");
    std::fs::write(&path, text)?;
    Ok(path)
}

/// Print a human-readable summary of the run to stdout, independent of
/// the log level.
fn print_run_summary(analysis: &Analysis, dataset: &Path) {
    let report = &analysis.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    match &report.dataset {
        Some(overview) => println!(
            "Input:  {} ({} rows x {} columns)",
            dataset.display(),
            overview.rows,
            overview.columns
        ),
        None => println!("Input:  {}", dataset.display()),
    }
    match &analysis.saved_path {
        Some(path) => println!("Report: {}", path.display()),
        None => println!("Report: not saved"),
    }
    println!();

    println!("Pipeline Steps:");
    for (i, step) in report.stage_results.iter().enumerate() {
        let detail = step
            .output
            .as_deref()
            .or(step.error_message.as_deref())
            .unwrap_or("No output");
        println!("  {}. {:<12} [{}] {}", i + 1, step.name, step.status, detail);
    }
    println!();

    if let Some(ref summary) = report.summary_text {
        println!("Key Insights:");
        for line in summary.lines() {
            println!("  {line}");
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}
