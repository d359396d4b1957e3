use calendarBlock::cli::{self, Cli};
use calendarBlock::tasks::shutdown::spawn_signal_watcher;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() {
    // stdout belongs to the status bar
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    spawn_signal_watcher();

    if let Err(e) = cli::cli(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
