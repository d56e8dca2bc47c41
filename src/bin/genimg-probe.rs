//! CLI that dumps deployment diagnostics.

use clap::Parser;
use genimg::probe::DEFAULT_PYTHON;
use genimg::{EnvironmentProbe, InstallPolicy, ProbeConfig};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genimg-probe")]
#[command(about = "Print interpreter, package and virtual environment diagnostics")]
#[command(version)]
struct Cli {
    /// Python interpreter to inspect
    #[arg(long, env = "GENIMG_PYTHON", default_value = DEFAULT_PYTHON)]
    python: String,

    /// Try `pip install` once for missing packages
    #[arg(long)]
    install_missing: bool,

    /// Per-subprocess timeout in seconds
    #[arg(long, env = "GENIMG_PROBE_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Log progress at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "genimg=debug" } else { "genimg=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ProbeConfig {
        python: cli.python,
        install_policy: if cli.install_missing {
            InstallPolicy::Attempt
        } else {
            InstallPolicy::Never
        },
        timeout: Duration::from_secs(cli.timeout_secs),
        ..ProbeConfig::default()
    };

    let report = EnvironmentProbe::new(config).collect().await;
    for dependency in &report.dependencies {
        if let Err(e) = dependency.require() {
            tracing::warn!("{e}");
        }
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report.to_json_pretty()?)?;
    writeln!(stdout)?;
    write!(stdout, "{}", report.render_venv_section())?;
    stdout.flush()?;

    Ok(())
}
