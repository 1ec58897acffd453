//! Looking Glass - logs a single snapshot of host CPU, memory, disk, and
//! network metrics, then exits.

use anyhow::Result;
use clap::Parser;
use glass::logging::{self, LogConfig, LogFormat};
use glass::metrics::DEFAULT_PROC_ROOT;
use glass::{register_collectors, run_collectors, CollectorKind, Config, ProcfsSource, TracingSink};
use std::path::PathBuf;
use std::sync::Arc;

/// One-shot host metrics snapshot
#[derive(Parser, Debug)]
#[command(name = "glass")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filesystem path whose usage the disk collector reports
    #[arg(long, default_value = "/")]
    mount_path: PathBuf,

    /// Collectors to run (comma separated)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values = ["cpu", "memory", "disk", "network"]
    )]
    collectors: Vec<CollectorKind>,

    /// Report CPU times per logical CPU instead of the aggregate
    #[arg(long)]
    per_cpu: bool,

    /// Report counters per network interface instead of the combined total
    #[arg(long)]
    per_nic: bool,

    /// procfs mount point
    #[arg(long, default_value = DEFAULT_PROC_ROOT)]
    proc_root: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Disable ANSI colors in text output
    #[arg(long)]
    no_ansi: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            mount_path: self.mount_path.clone(),
            collectors: self.collectors.clone(),
            per_cpu: self.per_cpu,
            per_nic: self.per_nic,
        }
    }

    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            no_ansi: self.no_ansi,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(&args.log_config())?;

    tracing::info!("Looking Glass");

    let source = Arc::new(ProcfsSource::with_root(&args.proc_root));
    let collectors = register_collectors(&args.config(), source);
    let summary = run_collectors(&collectors, &mut TracingSink);

    tracing::debug!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "collection finished"
    );

    Ok(())
}
