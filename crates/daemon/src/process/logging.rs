use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "quill.log";

/// Keeps the non-blocking writers flushing; logging stops when dropped.
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

fn filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Compact stdout logging, plus a daily-rolling plain file under `log_dir`
/// when one is given. `RUST_LOG` overrides `level` for both.
pub fn init(level: tracing::Level, log_dir: Option<&Path>) -> LogGuards {
    let mut guards = Vec::new();

    let (stdout_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(guard);
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(filter(level));

    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Warning: cannot create log directory {}: {}", dir.display(), e);
            return None;
        }
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(filter(level)),
        )
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    LogGuards(guards)
}

/// Route panics through `tracing` so they land in the log files too.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location();
        tracing::error!(
            panic.file = location.map(|l| l.file()),
            panic.line = location.map(|l| l.line()),
            "panic: {}",
            info
        );
    }));
}
