use std::path::PathBuf;
use std::time::Duration;

use crate::state::GenerationConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// directory holding document content, if not set then
    ///  content is kept in memory
    pub files_path: Option<PathBuf>,

    // model server
    pub generation: GenerationConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,

    /// How long SIGTERM waits for in-flight requests before stopping
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 5001,
            sqlite_path: None,
            files_path: None,
            generation: GenerationConfig::default(),
            log_level: tracing::Level::INFO,
            log_dir: None,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}
