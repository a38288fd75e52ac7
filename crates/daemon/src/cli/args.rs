pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Personal writing workspace with a model-backed assistant")]
pub struct Args {
    /// API server to talk to (defaults to the configured api_port on localhost)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the quill config directory (defaults to ~/.quill)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
