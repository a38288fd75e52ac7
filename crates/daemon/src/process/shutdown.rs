//! One shutdown request shared by the signal listener, the API server and
//! anyone holding a [`Shutdown`] clone.

use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<()>,
}

impl Default for Shutdown {
    fn default() -> Self {
        let (tx, _) = watch::channel(());
        Self { tx }
    }
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        self.tx.send_replace(());
    }
}

/// Listen for Ctrl-C and SIGTERM until shutdown is requested.
///
/// Ctrl-C stops at once. SIGTERM first waits `grace` so requests already
/// talking to the model server can finish. A programmatic
/// [`Shutdown::trigger`] also ends the listener.
pub fn listen(shutdown: &Shutdown, grace: Duration) -> std::io::Result<JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut requested = shutdown.subscribe();
    let shutdown = shutdown.clone();

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("SIGINT received, stopping");
            }
            _ = sigterm.recv() => {
                tracing::info!(grace_secs = grace.as_secs(), "SIGTERM received, draining");
                tokio::time::sleep(grace).await;
            }
            _ = requested.changed() => {
                tracing::debug!("shutdown requested");
                return;
            }
        }
        shutdown.trigger();
    }))
}
