//! Configuration manager for loading the viewer configuration

use std::path::{Path, PathBuf};

use viewer_core::ViewerConfig;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] ron::error::SpannedError),

    #[error("Unsupported config version {found} (newest known is {supported})")]
    Version { found: u32, supported: u32 },
}

/// Loads the viewer configuration once at startup.
///
/// A missing or broken file is not fatal: the defaults are used and the
/// problem is logged.
pub struct ConfigManager {
    config: ViewerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load from the OS-standard location, falling back to defaults
    pub fn new() -> Self {
        Self::with_path(Self::config_path())
    }

    /// Load from `config_path`, falling back to defaults
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = match Self::load_from_path(&config_path) {
            Ok(Some(config)) => {
                tracing::info!("Loaded config from {:?}", config_path);
                config
            }
            Ok(None) => {
                tracing::info!("No config file found, using defaults");
                ViewerConfig::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load config file {:?}: {}", config_path, e);
                ViewerConfig::new()
            }
        };

        Self {
            config,
            config_path,
        }
    }

    /// Get the OS-standard configuration directory
    #[cfg(not(target_arch = "wasm32"))]
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glb-viewer")
    }

    #[cfg(target_arch = "wasm32")]
    fn config_dir() -> PathBuf {
        PathBuf::from(".")
    }

    /// Get the configuration file path
    fn config_path() -> PathBuf {
        Self::config_dir().join("config.ron")
    }

    /// Read and validate a config file; `Ok(None)` when it does not exist
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &Path) -> Result<Option<ViewerConfig>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = ViewerConfig::from_ron(&content)?;
        if config.version > ViewerConfig::CURRENT_VERSION {
            return Err(ConfigError::Version {
                found: config.version,
                supported: ViewerConfig::CURRENT_VERSION,
            });
        }
        Ok(Some(config))
    }

    /// The browser build has no config file and always uses defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_path(_path: &Path) -> Result<Option<ViewerConfig>, ConfigError> {
        Ok(None)
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Get the config file path (for display purposes)
    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }

    /// Hand over the configuration, optionally pointing it at another model
    pub fn into_config(self, model_path: Option<String>) -> ViewerConfig {
        let mut config = self.config;
        if let Some(path) = model_path {
            config.asset.model_path = path;
        }
        config
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
