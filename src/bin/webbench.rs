//! CLI for benchmarking and ranking web projects

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webbench::{
    render_json, render_markdown, render_table, run_ranking_with_timeouts, ProjectsDoc, WeightsDoc,
};

#[derive(Parser)]
#[command(name = "webbench")]
#[command(about = "Benchmark web projects and print a ranked comparison table", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the metric weights YAML
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Path to the projects YAML
    #[arg(short = 'p', long)]
    projects: PathBuf,

    /// Output format
    #[arg(short = 'f', long, default_value = "table")]
    format: ReportFormat,

    /// Seconds to wait for a declared dev server to become reachable
    #[arg(long, default_value_t = 30)]
    ready_timeout: u64,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Table,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Configuration problems are the only fatal errors.
    let weights = match WeightsDoc::load(&cli.config) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };
    let projects = match ProjectsDoc::load(&cli.projects) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Evaluating {} project(s)...", projects.projects.len()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let results = run_ranking_with_timeouts(
        &projects.projects,
        &weights,
        std::time::Duration::from_secs(cli.ready_timeout),
    )
    .await;

    spinner.finish_and_clear();

    let metric_names = weights.metric_names();
    match cli.format {
        ReportFormat::Table => {
            println!("\n{}", "=== Ranked Results ===".bold());
            print!("{}", render_table(&results, &metric_names));
            print_warnings(&results);
        }
        ReportFormat::Markdown => {
            println!("{}", render_markdown(&results, &metric_names));
        }
        ReportFormat::Json => match render_json(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{} Failed to serialize results: {}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
    }
}

fn print_warnings(results: &[webbench::RankedResult]) {
    for result in results {
        for warning in &result.warnings {
            eprintln!(
                "{} {}: {}",
                "Warning:".yellow().bold(),
                result.project_name,
                warning.yellow()
            );
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
