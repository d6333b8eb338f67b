//! # linkscout CLI
//!
//! Command-line front end for the link check pipeline.
//!
//! - `check <url>`: one run, printed as text or JSON
//! - `interactive`: every stdin line is a new submission; runs overlap and
//!   only the newest submission's result is shown
//!
//! API keys come from `LINKSCOUT_FETCH_API_KEY` and
//! `LINKSCOUT_SAFE_BROWSING_API_KEY`.

mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use linkscout::pipeline::StateUpdate;
use linkscout::{CheckPolicy, Config, ConfigBuilder, Pipeline, PipelineResult, ResultSlot};
use telemetry::{OtelGuard, TelemetryOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Check whether a link is safe and what it points to", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Export traces and metrics over OTLP/HTTP
    #[arg(long, global = true)]
    otel: bool,

    /// Write logs to linkscout.log in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a single URL
    Check(CheckArgs),

    /// Check URLs read line by line from stdin
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// URL to check
    #[arg(default_value = "")]
    url: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(flatten)]
    collaborators: CollaboratorArgs,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(flatten)]
    collaborators: CollaboratorArgs,
}

#[derive(Args, Debug)]
struct CollaboratorArgs {
    /// Run the threat lookup even when the page could not be fetched (eager),
    /// or stop right there (short-circuit)
    #[arg(short, long, default_value = "eager", value_parser = ["eager", "short-circuit"])]
    policy: String,

    /// Timeout for each outbound call in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Fetch service endpoint
    #[arg(long)]
    fetch_endpoint: Option<String>,

    /// Threat lookup endpoint
    #[arg(long)]
    threat_endpoint: Option<String>,
}

impl CollaboratorArgs {
    fn config(&self) -> anyhow::Result<Config> {
        let mut builder = ConfigBuilder::from_config(Config::from_env()?)
            .check_policy(self.policy.parse::<CheckPolicy>()?);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout_secs(timeout);
        }
        if let Some(endpoint) = &self.fetch_endpoint {
            builder = builder.fetch_endpoint(endpoint.clone());
        }
        if let Some(endpoint) = &self.threat_endpoint {
            builder = builder.threat_endpoint(endpoint.clone());
        }

        Ok(builder.build())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    let _otel: OtelGuard = telemetry::init_tracing_subscriber(&TelemetryOptions {
        otel: cli.otel,
        log_dir: cli.log_dir.clone(),
    })?;

    let success = match cli.command {
        Some(Commands::Check(args)) => check_command(args).await?,
        Some(Commands::Interactive(args)) => interactive_command(args).await?,
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["linkscout", "--help"]);
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[instrument]
async fn check_command(args: CheckArgs) -> anyhow::Result<bool> {
    let config = args.collaborators.config()?;
    let pipeline = Pipeline::from_config(&config)?;
    let slot = ResultSlot::new();
    let token = pipeline.begin(&slot);

    let result = if args.format == "text" {
        let (progress_sender, progress_receiver) = mpsc::channel(16);
        let spinner = spawn_spinner(progress_receiver)?;
        let result = pipeline
            .run_with_progress(token, &args.url, Some(progress_sender))
            .await;
        let _ = spinner.await;
        result
    } else {
        pipeline.run(token, &args.url).await
    };

    print_result(&result, &args.format)?;
    let success = result.is_success();
    slot.apply(result).await;

    Ok(success)
}

#[instrument]
async fn interactive_command(args: InteractiveArgs) -> anyhow::Result<bool> {
    let config = args.collaborators.config()?;
    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    let slot = ResultSlot::new();
    let format = Arc::new(args.format);

    eprintln!("Enter a URL per line, Ctrl-D to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut runs = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        reap_finished(&mut runs);

        let token = pipeline.begin(&slot);
        let pipeline = Arc::clone(&pipeline);
        let slot = slot.clone();
        let format = Arc::clone(&format);

        runs.spawn(async move {
            let result = pipeline.run(token, &line).await;
            let rendered = render(&result, &format);
            if slot.apply(result).await {
                match rendered {
                    Ok(output) => println!("{output}"),
                    Err(e) => eprintln!("Failed to render result: {e}"),
                }
            }
        });
    }

    while let Some(outcome) = runs.join_next().await {
        if let Err(e) = outcome {
            tracing::error!("Pipeline task failed: {}", e);
        }
    }

    Ok(slot
        .current()
        .await
        .map(|result| result.is_success())
        .unwrap_or(true))
}

/// Collect runs that already finished, returning how many were collected
fn reap_finished(runs: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(outcome) = runs.try_join_next() {
        if let Err(e) = outcome {
            tracing::error!("Pipeline task failed: {}", e);
        }
        reaped += 1;
    }
    reaped
}

/// Show pipeline states on a spinner until the run drops its sender
fn spawn_spinner(
    mut progress_receiver: mpsc::Receiver<StateUpdate>,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    Ok(tokio::spawn(async move {
        while let Some(update) = progress_receiver.recv().await {
            spinner.set_message(update.state.to_string());
        }
        spinner.finish_and_clear();
    }))
}

fn print_result(result: &PipelineResult, format: &str) -> anyhow::Result<()> {
    let output = render(result, format)?;
    if goes_to_stdout(result, format) {
        println!("{output}");
    } else {
        eprintln!("{output}");
    }
    Ok(())
}

// JSON is always a document on stdout; failure shows in the exit code
fn goes_to_stdout(result: &PipelineResult, format: &str) -> bool {
    format == "json" || result.is_success()
}

fn render(result: &PipelineResult, format: &str) -> anyhow::Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(result)?),
        _ => Ok(render_text(result)),
    }
}

fn render_text(result: &PipelineResult) -> String {
    let metadata = match &result.outcome {
        Ok(metadata) => metadata,
        Err(err) => return format!("{}: {}", result.input, err),
    };

    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let published = match metadata.published_at() {
        Some(date) => date.format("%Y-%m-%d %H:%M %:z").to_string(),
        None => field(&metadata.published_date),
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", field(&metadata.title)));
    out.push_str(&format!("{}\n", field(&metadata.description)));
    out.push_str(&format!("Author: {}\n", field(&metadata.author)));
    out.push_str(&format!("Type: {}\n", field(&metadata.page_type)));
    out.push_str(&format!("URL: {}\n", field(&metadata.canonical_url)));
    out.push_str(&format!("Locale: {}\n", field(&metadata.locale)));
    out.push_str(&format!("Published Date: {}\n", published));
    out.push_str(&format!("Image: {}", field(&metadata.image)));
    out
}
