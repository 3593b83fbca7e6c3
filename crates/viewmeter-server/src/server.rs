//! Serve loop and shutdown sequence.

use std::future::Future;

use tokio::net::TcpListener;

use viewmeter_core::error::{MeterError, Result};

use crate::app_state::AppState;
use crate::drain::DrainReport;
use crate::router;

/// Serve `state` on `listener` until `shutdown` resolves, then stop the
/// periodic tasks and run one last drain so the partial window is persisted.
///
/// The final drain runs even when the server itself fails.
pub async fn serve<F>(state: AppState, listener: TcpListener, shutdown: F) -> Result<DrainReport>
where
    F: Future<Output = ()> + Send + 'static,
{
    let tasks = state.spawn_background();
    let app = router::build_router(state.clone());

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(
            listen = %addr,
            store = %state.persister().path().display(),
            "viewmeter-server starting"
        );
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MeterError::Internal(format!("server failed: {e}")));

    tasks.abort();
    let report = state.drain_and_persist().await;
    tracing::info!(persisted = report.persisted, failed = report.failed, "final drain complete");

    served.map(|()| report)
}
