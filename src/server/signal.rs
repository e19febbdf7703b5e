// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)
// - SIGUSR1: toggle access logging

use std::sync::Arc;
use tokio::sync::watch;

use crate::config::AppState;
use crate::logger;

/// Process-wide shutdown flag observed by the accept loop and every connection
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown was triggered (immediately if it already was)
pub async fn triggered(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        // Every Shutdown handle is gone; nothing can trigger any more
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Start signal handlers (Unix)
///
/// | Signal  | Action                 |
/// |---------|------------------------|
/// | SIGTERM | Graceful stop          |
/// | SIGINT  | Graceful stop          |
/// | SIGUSR1 | Toggle access logging  |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>, shutdown: Shutdown) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let registered = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::user_defined1()),
        );
        let (mut sigterm, mut sigint, mut sigusr1) = match registered {
            (Ok(term), Ok(int), Ok(usr1)) => (term, int, usr1),
            (term, int, usr1) => {
                let err = [term.err(), int.err(), usr1.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .map_or_else(String::new, |e| e.to_string());
                logger::log_error(&format!(
                    "Failed to register signal handlers ({err}); falling back to Ctrl+C"
                ));
                if tokio::signal::ctrl_c().await.is_ok() {
                    shutdown.trigger();
                }
                return;
            }
        };

        logger::write_info(&format!(
            "Signals: SIGTERM/SIGINT stop, SIGUSR1 toggles access log (pid {})",
            std::process::id()
        ));

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    logger::write_info("[Signal] SIGTERM received");
                    shutdown.trigger();
                    break;
                }
                _ = sigint.recv() => {
                    logger::write_info("[Signal] SIGINT received");
                    shutdown.trigger();
                    break;
                }
                _ = sigusr1.recv() => {
                    let enabled = !state.access_log_enabled();
                    state.set_access_log(enabled);
                    logger::write_info(&format!(
                        "[Signal] SIGUSR1 received, access log {}",
                        if enabled { "enabled" } else { "disabled" }
                    ));
                }
            }
        }
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(_state: Arc<AppState>, shutdown: Shutdown) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::write_info("[Signal] Ctrl+C received");
            shutdown.trigger();
        }
    });
}
