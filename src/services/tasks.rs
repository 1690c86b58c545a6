use std::future::Future;

use tokio::sync::oneshot;
use tracing::warn;

/// Submit a background task and hand back a completion channel. Callers
/// that only want fire-and-forget semantics simply drop the receiver; the
/// task keeps running and its outcome is still logged.
pub fn submit<F>(name: &'static str, task: F) -> oneshot::Receiver<anyhow::Result<()>>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = task.await;
        if let Err(e) = &result {
            warn!("background task '{}' failed: {}", name, e);
        }
        // Receiver may have been dropped; that is fine.
        let _ = tx.send(result);
    });
    rx
}
