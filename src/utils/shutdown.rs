use std::future::Future;
use std::io;

use tracing::error;

/// Resolves when `signal` fires. If the listener cannot be installed this
/// never resolves, so the service keeps running instead of stopping at once.
pub async fn until_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
