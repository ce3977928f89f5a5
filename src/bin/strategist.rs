//! Strategist Binary - Cross-Layer Strategic Analysis
//!
//! Reads signals from the configured store, runs the analysis pipeline and
//! prints the recommendation envelope as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # One analysis over the last hour
//! cargo run --release --bin strategist -- analyze --pretty
//!
//! # Explicit window, SQLite store
//! cargo run --release --bin strategist -- analyze \
//!     --start 2024-05-01T00:00:00Z --end 2024-05-01T06:00:00Z --backend sqlite
//!
//! # Periodic analysis until Ctrl-C
//! cargo run --release --bin strategist -- watch --interval-secs 60 --output reports/runs.jsonl
//! ```
//!
//! ## Environment Variables
//!
//! See `AnalyzerConfig::from_env`. Command-line flags override them.
//! RUST_LOG sets the logging level (default: info). Logs go to stderr.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strategist::analysis::StrategicAnalyzer;
use strategist::config::{parse_layers, AnalyzerConfig};
use strategist::report::{AnalysisReport, ReportError, ReportWriter};
use strategist::request::AnalysisRequest;
use strategist::StrategicRecommendationOutput;
use tokio::time::{interval, Duration};

#[derive(Parser, Debug)]
#[command(name = "strategist", version, about = "Cross-layer strategic recommendation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one analysis and print the output envelope
    Analyze {
        /// Window start (RFC 3339); requires --end
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Window end (RFC 3339); requires --start
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        /// Correlation id for this run (UUID); generated when omitted
        #[arg(long)]
        execution_ref: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Re-run the analysis on a fixed interval until Ctrl-C
    Watch {
        /// Seconds between runs (default: EMISSION_INTERVAL_SECS)
        #[arg(long)]
        interval_secs: Option<u64>,

        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// Trailing window length in seconds
    #[arg(long)]
    lookback_secs: Option<i64>,

    /// Comma-separated layer list; empty means every layer
    #[arg(long)]
    layers: Option<String>,

    #[arg(long)]
    min_confidence: Option<f64>,

    #[arg(long)]
    max_recommendations: Option<usize>,

    /// Signal store: jsonl, sqlite or http
    #[arg(long)]
    backend: Option<String>,

    /// Append each report to this JSONL file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SelectionArgs {
    fn apply_overrides(&self, config: &mut AnalyzerConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(backend) = &self.backend {
            config.backend = backend.parse()?;
        }
        if let Some(output) = &self.output {
            config.report_path = Some(output.clone());
        }
        Ok(())
    }

    fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            lookback_secs: self.lookback_secs,
            source_layers: self.layers.as_deref().map(parse_layers),
            min_confidence: self.min_confidence,
            max_recommendations: self.max_recommendations,
            ..Default::default()
        }
    }
}

fn open_report_writer(config: &AnalyzerConfig) -> Result<Option<ReportWriter>, Box<dyn std::error::Error>> {
    match &config.report_path {
        Some(path) => Ok(Some(ReportWriter::new(path.clone())?)),
        None => Ok(None),
    }
}

fn record(
    writer: &mut Option<ReportWriter>,
    execution_ref: &str,
    output: &StrategicRecommendationOutput,
) -> Result<(), ReportError> {
    if let Some(writer) = writer {
        let report = AnalysisReport {
            execution_ref: execution_ref.to_string(),
            generated_at: Utc::now(),
            output: output.clone(),
        };
        writer.write_report(&report)?;
    }
    Ok(())
}

fn log_config(config: &AnalyzerConfig) {
    log::info!("🚀 Starting Strategist");
    log::info!("   Backend: {}", config.backend.as_str());
    log::info!("   Layers: {:?}", config.source_layers);
    log::info!("   Min confidence: {}", config.min_confidence);
    log::info!("   Max recommendations: {}", config.max_recommendations);
    if let Some(path) = &config.report_path {
        log::info!("   Report output: {}", path.display());
    }
}

async fn run_analyze(
    config: AnalyzerConfig,
    request: AnalysisRequest,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = request.into_input(&config, Utc::now())?;
    let analyzer = StrategicAnalyzer::new(config.build_source()?);
    let mut writer = open_report_writer(&config)?;

    log::info!(
        "🔍 Analyzing {} → {} via {}",
        input.time_window.start,
        input.time_window.end,
        analyzer.source_type()
    );

    let output = analyzer.analyze(&input).await?;
    record(&mut writer, &input.execution_ref, &output)?;

    if let Some(writer) = writer.as_mut() {
        writer.flush()?;
        log::info!("📝 Report appended to {}", writer.path().display());
    }

    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}

async fn run_watch(
    config: AnalyzerConfig,
    selection: SelectionArgs,
    interval_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    // Reject a bad selection once, up front
    selection.to_request().into_input(&config, Utc::now())?;

    let analyzer = StrategicAnalyzer::new(config.build_source()?);
    let mut writer = open_report_writer(&config)?;

    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

    log::info!("✅ Strategist running - analysis every {}s", interval_secs);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let input = selection.to_request().into_input(&config, Utc::now())?;

                match analyzer.analyze(&input).await {
                    Ok(output) => {
                        for rec in &output.recommendations {
                            log::info!(
                                "🎯 {:?} {:?}: {} (confidence {:.3})",
                                rec.priority,
                                rec.category,
                                rec.title,
                                rec.confidence
                            );
                        }
                        if let Err(e) = record(&mut writer, &input.execution_ref, &output) {
                            log::error!("Failed to write analysis report: {}", e);
                        }
                    }
                    Err(e) => {
                        log::error!("❌ Analysis {} failed: {}", input.execution_ref, e);
                    }
                }

                if let Some(writer) = writer.as_mut() {
                    if let Err(e) = writer.flush() {
                        log::error!("Failed to flush analysis reports: {}", e);
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                log::info!("🛑 Shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AnalyzerConfig::from_env()?;

    match cli.command {
        Command::Analyze {
            start,
            end,
            execution_ref,
            pretty,
            selection,
        } => {
            selection.apply_overrides(&mut config)?;
            log_config(&config);

            let request = AnalysisRequest {
                start,
                end,
                execution_ref,
                ..selection.to_request()
            };
            run_analyze(config, request, pretty).await
        }
        Command::Watch {
            interval_secs,
            selection,
        } => {
            selection.apply_overrides(&mut config)?;
            log_config(&config);

            let interval_secs = interval_secs.unwrap_or(config.emission_interval_secs);
            run_watch(config, selection, interval_secs).await
        }
    }
}
