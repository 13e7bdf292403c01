use config::{Config as ConfigLoader, ConfigError, Environment, File, FileFormat};
use folio_upload::UploadLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Compiled-in defaults, so the binary runs from any directory
const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadLimits,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// API root, without a trailing `/upload` or `/chat/stream`
    pub base_url: String,
}

impl ServerConfig {
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub model: String,
    #[serde(default = "default_total_steps")]
    pub total_steps: u32,
}

fn default_total_steps() -> u32 {
    folio_stream::accumulator::DEFAULT_TOTAL_STEPS
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per persisted value
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml (if present)
    /// 3. config/{FOLIO_ENV}.toml (if FOLIO_ENV is set)
    /// 4. Environment variables, e.g. FOLIO_SERVER__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same as [`Config::load`] with the optional files looked up in `dir`
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();

        let mut builder = ConfigLoader::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(dir.join("default")).required(false));

        if let Ok(env) = std::env::var("FOLIO_ENV") {
            builder = builder.add_source(File::from(dir.join(env)).required(false));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
