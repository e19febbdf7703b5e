// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::{triggered, Shutdown};
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is triggered.
///
/// Must run inside a `LocalSet`: connections are spawned with `spawn_local`.
/// Returns once every connection closed or `performance.shutdown_grace`
/// elapsed, whichever comes first.
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: Shutdown) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => {
                    accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        shutdown.subscribe(),
                    );
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            () = triggered(&mut stop) => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));
    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    let remaining = drain(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait for the active connection count to reach zero, at most `grace`
async fn drain(active: &AtomicUsize, grace: Duration) -> usize {
    let wait_idle = async {
        while active.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    };
    let _ = tokio::time::timeout(grace, wait_idle).await;
    active.load(Ordering::SeqCst)
}
