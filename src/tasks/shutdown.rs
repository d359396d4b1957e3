use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Exits the process on SIGINT/SIGTERM so a hung provider call cannot keep
/// the status bar waiting.
pub fn spawn_signal_watcher() -> JoinHandle<()> {
    tokio::spawn(async {
        match wait_for_signal().await {
            Ok((name, signo)) => {
                warn!(signal = name, "Signal caught");
                error!("Exiting");
                std::process::exit(128 + signo);
            }
            Err(err) => warn!(error = %err, "unable to install signal handlers"),
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<(&'static str, i32)> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => Ok(("SIGINT", 2)),
        _ = terminate.recv() => Ok(("SIGTERM", 15)),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<(&'static str, i32)> {
    tokio::signal::ctrl_c().await?;
    Ok(("ctrl-c", 2))
}
