//! gpuprobe CLI - Query device telemetry from the command line

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gpuprobe_core::port::QueryError;
use gpuprobe_core::{
    cancel_channel, DeviceRecord, DeviceSelector, GpuQueryService, ProbeError, ProcessRecord,
    QueryContext,
};
use gpuprobe_infra_smi::{SmiConfig, SmiRunner, SMI_BINARY};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Parser)]
#[command(name = "gpuprobe")]
#[command(about = "GPU telemetry via the vendor diagnostics tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Diagnostics binary to invoke
    #[arg(long, env = "GPUPROBE_SMI_BIN", default_value = SMI_BINARY)]
    smi_bin: String,

    /// Per-query deadline in seconds (0 disables the deadline)
    #[arg(long, env = "GPUPROBE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List device telemetry
    Devices {
        /// Restrict to devices by index or UUID (repeatable)
        #[arg(short = 'i', long = "id")]
        selectors: Vec<String>,
    },

    /// List compute processes holding device contexts
    Processes {
        /// Restrict to devices by index or UUID (repeatable)
        #[arg(short = 'i', long = "id")]
        selectors: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable table with a summary line
    Table,
    /// Pretty-printed JSON records
    Json,
    /// One comma-separated line per record
    Plain,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "IDX")]
    index: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "UTIL %")]
    utilization: String,
    #[tabled(rename = "MEM USED/TOTAL MiB")]
    memory: String,
    #[tabled(rename = "DRIVER")]
    driver: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SERIAL")]
    serial: String,
    #[tabled(rename = "POWER W")]
    power: String,
    #[tabled(rename = "TEMP C")]
    temperature: String,
    #[tabled(rename = "TIMESTAMP")]
    timestamp: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            index: record.index.clone(),
            uuid: record.uuid.clone(),
            utilization: record.utilization_gpu.clone(),
            memory: format!("{}/{}", record.memory_used, record.memory_total),
            driver: record.driver_version.clone(),
            name: record.name.clone(),
            serial: record.serial.clone(),
            power: format!("{}/{}", record.power_draw, record.power_limit),
            temperature: record.temperature.clone(),
            timestamp: record.timestamp.clone(),
        }
    }
}

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "TIMESTAMP")]
    timestamp: String,
    #[tabled(rename = "DEVICE")]
    device: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "PROCESS")]
    process: String,
    #[tabled(rename = "MEM MiB")]
    memory: String,
}

impl From<&ProcessRecord> for ProcessRow {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            device: record.name.clone(),
            uuid: record.uuid.clone(),
            pid: record.pid.clone(),
            process: record.process_name.clone(),
            memory: record.used_memory.clone(),
        }
    }
}

fn init_tracing() {
    let log_format = std::env::var("GPUPROBE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    // Quiet by default; RUST_LOG overrides. Logs go to stderr so stdout
    // stays clean for the data formats.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_context(timeout_secs: u64) -> QueryContext {
    let (source, token) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            source.cancel();
        }
    });

    let ctx = QueryContext::with_token(token);
    if timeout_secs > 0 {
        ctx.and_timeout(Duration::from_secs(timeout_secs))
    } else {
        ctx
    }
}

fn to_selectors(raw: Vec<String>) -> Vec<DeviceSelector> {
    raw.into_iter().map(DeviceSelector::from).collect()
}

fn render_devices(records: &[DeviceRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Plain => {
            for record in records {
                println!("{record}");
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("{}", "No devices reported".yellow());
                return Ok(());
            }
            println!(
                "{}",
                format!("✓ {} devices reported", records.len()).green().bold()
            );
            println!();
            let rows: Vec<DeviceRow> = records.iter().map(DeviceRow::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

fn render_processes(records: &[ProcessRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Plain => {
            for record in records {
                println!("{record}");
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("{}", "No compute processes running".yellow());
                return Ok(());
            }
            println!(
                "{}",
                format!("✓ {} compute processes", records.len())
                    .green()
                    .bold()
            );
            println!();
            let rows: Vec<ProcessRow> = records.iter().map(ProcessRow::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

/// Cancellation gets a clean message and a conventional exit code (130 for
/// interrupt, 124 for deadline); everything else bubbles up through anyhow.
fn bail_if_cancelled(err: ProbeError) -> ProbeError {
    if err.is_cancellation() {
        eprintln!("{}", format!("✗ {err}").red().bold());
        let code = match err {
            ProbeError::Execution(QueryError::DeadlineExceeded(_)) => 124,
            _ => 130,
        };
        std::process::exit(code);
    }
    err
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runner = SmiRunner::with_config(SmiConfig {
        binary: cli.smi_bin.clone(),
    });
    let service = GpuQueryService::new(Arc::new(runner));
    let ctx = build_context(cli.timeout_secs);

    match cli.command {
        Commands::Devices { selectors } => {
            let records = service
                .list_devices(&ctx, &to_selectors(selectors))
                .await
                .map_err(bail_if_cancelled)
                .context("device query failed")?;
            render_devices(&records, cli.format)?;
        }

        Commands::Processes { selectors } => {
            let records = service
                .list_processes(&ctx, &to_selectors(selectors))
                .await
                .map_err(bail_if_cancelled)
                .context("compute process query failed")?;
            render_processes(&records, cli.format)?;
        }
    }

    Ok(())
}
