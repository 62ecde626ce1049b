//! sonar-export CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use sonar_export::config;
use sonar_export::export::ExportEngine;
use sonar_export::models::{ExportKind, ExportSummary};

/// Export SonarQube rules, issues, hotspots and findings to CSV
#[derive(Parser)]
#[command(name = "sonar-export", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file with SONARQUBE_HOST and SONARQUBE_TOKEN (JSON or .toml)
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Directory the CSV files are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Abort the whole run after this many seconds
    #[arg(long, global = true)]
    max_runtime: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export rule metadata
    Rules,
    /// Export issues
    Issues,
    /// Export security hotspots for every project
    Hotspots,
    /// Export findings for every project, joined with rule details
    Findings,
    /// Run every export in sequence
    All,
    /// List available exporters
    Kinds,
}

impl Commands {
    fn kinds(&self) -> Vec<ExportKind> {
        match self {
            Commands::Rules => vec![ExportKind::Rules],
            Commands::Issues => vec![ExportKind::Issues],
            Commands::Hotspots => vec![ExportKind::Hotspots],
            Commands::Findings => vec![ExportKind::Findings],
            Commands::All => ExportKind::ALL.to_vec(),
            Commands::Kinds => Vec::new(),
        }
    }
}

fn print_summary(summaries: &[ExportSummary]) {
    let mut builder = Builder::default();
    builder.push_record(["Export", "Rows", "Pages", "Projects", "Rule misses", "Requests", "File"]);

    for s in summaries {
        builder.push_record([
            s.kind.to_string(),
            s.stats.rows.to_string(),
            s.stats.pages.to_string(),
            s.stats.projects.to_string(),
            s.stats.enrichment_misses.to_string(),
            s.requests.to_string(),
            s.output_path.display().to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sonar_export=debug"
    } else {
        "sonar_export=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let engine = ExportEngine::with_defaults();

    if let Commands::Kinds = cli.command {
        println!("  {}\n", "Available exporters:".bold());
        for (kind, description) in engine.list_exporters() {
            println!("    {} {}", format!("{:10}", kind.to_string()).cyan().bold(), description);
        }
        return;
    }

    let mut export_config = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  {} {e}", "Error:".red().bold());
            std::process::exit(1);
        }
    };
    config::merge_cli_args(&mut export_config, cli.output_dir, cli.timeout, cli.max_runtime);

    println!("  {} {}", "Server:".bold(), export_config.host.green());
    println!(
        "  {} {}\n",
        "Output:".bold(),
        export_config.output_dir.display().to_string().cyan()
    );

    match engine.run(&cli.command.kinds(), &export_config).await {
        Ok(summaries) => {
            print_summary(&summaries);
            println!("\n  {}", "✅ Done".green().bold());
        }
        Err(e) => {
            eprintln!("\n  {} {e}", "Export failed:".red().bold());
            std::process::exit(1);
        }
    }
}
