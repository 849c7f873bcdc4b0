//! Graceful shutdown signal handling.

use std::future::pending;
use std::time::Duration;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio::sync::oneshot;

use crate::TRACING_TARGET_SERVER_SHUTDOWN as TRACING_TARGET;

/// Waits for SIGTERM or Ctrl+C.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to install Ctrl+C handler"
            );
            pending::<()>().await;
        }

        tracing::info!(target: TRACING_TARGET, "received Ctrl+C signal");
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!(target: TRACING_TARGET, "received SIGTERM signal");
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "failed to install SIGTERM handler"
                );
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Pair of futures driving a graceful shutdown.
///
/// `signal` resolves on the first shutdown signal and starts the drain.
/// `deadline` resolves `timeout` after that, when in-flight requests must
/// be abandoned.
pub struct Shutdown {
    timeout: Duration,
    started: oneshot::Receiver<()>,
    notify: oneshot::Sender<()>,
}

impl Shutdown {
    /// Creates a shutdown pair with the given drain timeout.
    pub fn new(timeout: Duration) -> Self {
        let (notify, started) = oneshot::channel();
        Self {
            timeout,
            started,
            notify,
        }
    }

    /// Splits into the graceful-shutdown signal and the hard deadline.
    pub fn split(self) -> (impl Future<Output = ()>, impl Future<Output = ()>) {
        let Self {
            timeout,
            started,
            notify,
        } = self;

        let signal = async move {
            wait_for_signal().await;
            tracing::info!(
                target: TRACING_TARGET,
                timeout_secs = timeout.as_secs(),
                "graceful shutdown initiated"
            );
            let _ = notify.send(());
        };

        let deadline = async move {
            if started.await.is_err() {
                pending::<()>().await;
            }
            tokio::time::sleep(timeout).await;
        };

        (signal, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_never_fires_without_signal() {
        let (signal, deadline) = Shutdown::new(Duration::from_millis(1)).split();
        drop(signal);

        let fired = tokio::time::timeout(Duration::from_millis(50), deadline).await;
        assert!(fired.is_err());
    }
}
