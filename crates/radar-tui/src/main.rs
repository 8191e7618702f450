//! CLI entry point for the radar terminal dashboard.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use radar_api::{ApiClient, Report, TrendParams};
use radar_core::types::ReportFormat;

use radar_tui::config::{self, TuiConfig};
use radar_tui::settings::{default_settings_path, SettingsStore};
use radar_tui::tui;

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Terminal dashboard for the Compliance Radar backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file prefix (default: radar).
    #[arg(short, long, default_value = "radar", global = true)]
    config: String,

    /// Override the backend base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive dashboard (the default when no command is given).
    Tui,
    /// Backend liveness probe and system status, printed as JSON.
    Health,
    /// List the regulation catalog, or the controls of one regulation.
    Regulations {
        /// Regulation code to show controls for (e.g. NIS2).
        #[arg(long)]
        code: Option<String>,
    },
    /// Export a scan report.
    Report {
        /// Scan id to export.
        scan_id: i64,
        /// Export format: json, pdf, html.
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Write to this file instead of stdout (required for pdf/html).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Historical statistics: compliance trend and findings by resource.
    Stats {
        /// Trend window in days.
        #[arg(long)]
        days: Option<u32>,
        /// Restrict the trend to one regulation code.
        #[arg(long)]
        regulation: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let client = ApiClient::new(&config.api)?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_dashboard(runtime.handle().clone(), client, config),
        Command::Health => {
            init_cli_logging();
            runtime.block_on(print_health(&client))
        }
        Command::Regulations { code } => {
            init_cli_logging();
            runtime.block_on(print_regulations(&client, code.as_deref()))
        }
        Command::Report {
            scan_id,
            format,
            output,
        } => {
            init_cli_logging();
            let format = parse_format(&format)?;
            runtime.block_on(export_report(&client, scan_id, format, output))
        }
        Command::Stats { days, regulation } => {
            init_cli_logging();
            runtime.block_on(print_stats(&client, days, regulation))
        }
    }
}

fn run_dashboard(
    handle: tokio::runtime::Handle,
    client: ApiClient,
    config: TuiConfig,
) -> anyhow::Result<()> {
    let home = home_dir()?;
    init_tui_logging(&home)?;

    let settings = SettingsStore::open(default_settings_path(&home));
    tracing::info!(base_url = %client.base_url(), "Starting dashboard");
    tui::run(handle, client, config, settings)
}

async fn print_health(client: &ApiClient) -> anyhow::Result<()> {
    let health = client.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);

    match client.system_status().await {
        Ok(status) => println!("{}", serde_json::to_string_pretty(&status)?),
        Err(e) => tracing::warn!(error = %e, "System status unavailable"),
    }
    Ok(())
}

async fn print_regulations(client: &ApiClient, code: Option<&str>) -> anyhow::Result<()> {
    match code {
        Some(code) => {
            let controls = client.regulation_controls(code).await?;
            println!("{}", serde_json::to_string_pretty(&controls)?);
        }
        None => {
            let regulations = client.list_regulations().await?;
            println!("{}", serde_json::to_string_pretty(&regulations)?);
        }
    }
    Ok(())
}

async fn export_report(
    client: &ApiClient,
    scan_id: i64,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let report = client.report(scan_id, format).await?;
    match report {
        Report::Json(value) => {
            let pretty = serde_json::to_string_pretty(&value)?;
            match output {
                Some(path) => {
                    fs::write(&path, pretty)?;
                    tracing::info!(path = %path.display(), "Report written");
                }
                None => println!("{pretty}"),
            }
        }
        Report::Binary(bytes) => {
            let path = output.ok_or_else(|| {
                anyhow::anyhow!("--output is required for {format} reports")
            })?;
            fs::write(&path, bytes)?;
            tracing::info!(path = %path.display(), format = %format, "Report written");
        }
    }
    Ok(())
}

async fn print_stats(
    client: &ApiClient,
    days: Option<u32>,
    regulation: Option<String>,
) -> anyhow::Result<()> {
    let trend = client
        .compliance_trend(&TrendParams { days, regulation })
        .await?;
    println!("{}", serde_json::to_string_pretty(&trend)?);

    let by_resource = client.findings_by_resource().await?;
    println!("{}", serde_json::to_string_pretty(&by_resource)?);
    Ok(())
}

fn parse_format(s: &str) -> anyhow::Result<ReportFormat> {
    match s.to_lowercase().as_str() {
        "json" => Ok(ReportFormat::Json),
        "pdf" => Ok(ReportFormat::Pdf),
        "html" => Ok(ReportFormat::Html),
        _ => anyhow::bail!("Invalid format: {s}. Choose: json, pdf, html"),
    }
}

fn home_dir() -> anyhow::Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME is not set"))
}

/// Plain logging to stderr for one-shot commands; stdout stays machine-readable.
fn init_cli_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The dashboard owns the terminal, so logs go to a file instead.
fn init_tui_logging(home: &std::path::Path) -> anyhow::Result<()> {
    let dir = home.join(".config/radar/logs");
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("radar.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(Arc::new(file))
        .init();
    Ok(())
}
