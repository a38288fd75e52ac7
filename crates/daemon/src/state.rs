use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::generation::GenerationOptions;
use common::text::DEFAULT_MAX_CHUNK_LEN;

pub const APP_NAME: &str = "quill";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const FILES_DIR_NAME: &str = "files";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Model server settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_api_port() -> u16 {
    5001
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Where the model server lives and how it is asked to sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_url")]
    pub url: Url,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Upper bound, in characters, of one chunk sent to the model
    #[serde(default = "default_max_chunk_len")]
    pub max_chunk_len: usize,
}

fn default_generation_url() -> Url {
    Url::parse("http://localhost:11434").expect("hardcoded URL must parse")
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_temperature() -> f32 {
    GenerationOptions::default().temperature
}

fn default_num_ctx() -> u32 {
    GenerationOptions::default().num_ctx
}

fn default_top_k() -> u32 {
    GenerationOptions::default().top_k
}

fn default_top_p() -> f32 {
    GenerationOptions::default().top_p
}

fn default_max_chunk_len() -> usize {
    DEFAULT_MAX_CHUNK_LEN
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: default_generation_url(),
            model: default_model(),
            temperature: default_temperature(),
            num_ctx: default_num_ctx(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_chunk_len: default_max_chunk_len(),
        }
    }
}

impl GenerationConfig {
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            num_ctx: self.num_ctx,
            top_k: self.top_k,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the quill directory (~/.quill)
    pub quill_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the directory holding document content
    pub files_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the quill directory path (custom or default ~/.quill)
    pub fn quill_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new quill state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let quill_dir = Self::quill_dir(custom_path)?;

        if quill_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&quill_dir)?;

        let files_path = quill_dir.join(FILES_DIR_NAME);
        fs::create_dir_all(&files_path)?;

        let config = config.unwrap_or_default();
        let config_path = quill_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // the service runs migrations on first start
        let db_path = quill_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            quill_dir,
            db_path,
            files_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the quill directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let quill_dir = Self::quill_dir(custom_path)?;

        if !quill_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = quill_dir.join(DB_FILE_NAME);
        let files_path = quill_dir.join(FILES_DIR_NAME);
        let config_path = quill_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !files_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", FILES_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            quill_dir,
            db_path,
            files_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("quill directory not initialized. Run 'quill init' first")]
    NotInitialized,

    #[error("quill directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
