use clap::Parser;
use foldsync::commands::{shutdown_signal, Scheduler};
use foldsync::config::Cli;
use foldsync::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    foldsync::logging::init(config.log_file.as_deref())?;
    info!(
        "foldsync v{} mirroring {} into {}",
        foldsync::VERSION,
        config.source.display(),
        config.replica.display()
    );

    let stats = Scheduler::new(config)?.run_until(shutdown_signal()).await;
    info!(
        runs = stats.runs_started,
        skipped = stats.ticks_skipped,
        "foldsync stopped"
    );

    Ok(())
}
