//! Ctrl+C handling for evaluation runs

use futures::stream::StreamExt;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Listens for SIGINT while alive; stops listening when dropped
pub struct InterruptGuard {
    handle: Handle,
    task: JoinHandle<()>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        self.task.abort();
    }
}

/// Cancel `token` on the first Ctrl+C; a second one exits the process
pub fn cancel_on_interrupt(token: CancellationToken) -> std::io::Result<InterruptGuard> {
    let mut signals = Signals::new([SIGINT])?;
    let handle = signals.handle();

    let task = tokio::spawn(async move {
        while let Some(signal) = signals.next().await {
            if signal != SIGINT {
                continue;
            }
            if token.is_cancelled() {
                eprintln!("\nInterrupted again, exiting.");
                std::process::exit(130);
            }
            eprintln!("\nStopping evaluation... (Ctrl+C again to abort)");
            tracing::warn!("Interrupt received, cancelling run");
            token.cancel();
        }
    });

    Ok(InterruptGuard { handle, task })
}
