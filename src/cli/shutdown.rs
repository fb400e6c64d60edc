use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancellation` once the process is interrupted, so that the running session can be
/// saved before exiting.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received interrupt");
            cancellation.cancel();
        }
        Err(e) => error!("Failed to listen for interrupts {e:?}"),
    }
}
