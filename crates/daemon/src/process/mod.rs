mod logging;
mod shutdown;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::http_server;
use crate::{ServiceConfig, ServiceState};

pub use shutdown::Shutdown;

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle on a running service.
pub struct ShutdownHandle {
    signal_waiter: JoinHandle<()>,
    server: JoinHandle<()>,
    shutdown: Shutdown,
}

impl ShutdownHandle {
    /// Wait for a shutdown signal, then for the API server to drain.
    pub async fn wait(self) {
        let _ = self.signal_waiter.await;

        if timeout(FINAL_SHUTDOWN_TIMEOUT, self.server).await.is_err() {
            tracing::error!(
                "Failed to shut down within {} seconds",
                FINAL_SHUTDOWN_TIMEOUT.as_secs()
            );
            std::process::exit(4);
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }
}

/// Build the service state and spawn the API server.
///
/// Exits the process when the state cannot be built. The returned
/// `ShutdownHandle` must be kept alive; dropping it does not stop the service.
pub async fn start_service(service_config: &ServiceConfig) -> (ServiceState, ShutdownHandle) {
    let state = match ServiceState::from_config(service_config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let signal_waiter = match shutdown::listen(&shutdown, service_config.shutdown_grace) {
        Ok(waiter) => waiter,
        Err(e) => {
            tracing::error!("cannot listen for shutdown signals: {}", e);
            std::process::exit(3);
        }
    };

    let api_addr = SocketAddr::from(([0, 0, 0, 0], service_config.api_port));
    let api_config = http_server::Config::new(api_addr, service_config.log_level);
    let api_state = state.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = http_server::run_api(api_config, api_state, shutdown_rx).await {
            tracing::error!("API server error: {}", e);
        }
    });

    tracing::info!(
        model = %service_config.generation.model,
        backend = %service_config.generation.url,
        "Running: API on port {}",
        service_config.api_port
    );

    let handle = ShutdownHandle {
        signal_waiter,
        server,
        shutdown,
    };
    (state, handle)
}

/// Run the daemon until a shutdown signal arrives.
pub async fn spawn_service(service_config: &ServiceConfig) {
    let _guards = logging::init(service_config.log_level, service_config.log_dir.as_deref());
    logging::install_panic_hook();
    report_build_info();

    let (_, handle) = start_service(service_config).await;
    handle.wait().await;
}

fn report_build_info() {
    let build = common::prelude::build_info();
    tracing::info!(
        version = build.version,
        profile = build.build_profile,
        features = build.build_features,
        built_at = build.build_timestamp,
        "quill {} starting up",
        build.package_version
    );
}
