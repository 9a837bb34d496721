use crate::project_config::LUNA2D_PATH_ENV;
use crate::{DeployError, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "luna2d-deploy.toml";

/// Settings of the deploy tool itself, threaded explicitly through every
/// command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub engine: EngineConfig,
    pub compiler: CompilerConfig,
    pub cmake: CmakeConfig,
    pub logging: LoggingConfig,
}

/// Engine installation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub luna2d_path: Option<PathBuf>,
}

/// Script compiler overrides; defaults come from the engine installation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub path: Option<PathBuf>,
    pub path64: Option<PathBuf>,
}

/// Native build-system generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmakeConfig {
    pub program: String,
    pub android_abis: Vec<String>,
    pub android_api_level: String,
    pub android_stl: String,
    pub wp_generator: String,
    pub wp_system_version: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for CmakeConfig {
    fn default() -> Self {
        Self {
            program: "cmake".to_string(),
            android_abis: vec!["armeabi-v7a".to_string()],
            android_api_level: "android-9".to_string(),
            android_stl: "gnustl_static".to_string(),
            wp_generator: "Visual Studio 12 2013 ARM".to_string(),
            wp_system_version: "8.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(), // pretty, json, compact
        }
    }
}

impl DeployConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. `LUNA2D_PATH` environment variable
    /// 2. Environment variables (`LUNA2D_DEPLOY_*`, `__` between sections)
    /// 3. luna2d-deploy.toml file (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&std::env::current_dir()?)
    }

    /// Load configuration from a specific directory
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_file = dir.join(CONFIG_FILE_NAME);
        if config_file.exists() {
            builder = builder.add_source(File::from(config_file));
        }

        builder = builder.add_source(
            Environment::with_prefix("LUNA2D_DEPLOY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut result: DeployConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DeployError::Configuration(format!("Failed to build configuration: {}", e)))?;

        result.merge_env_vars();
        Ok(result)
    }

    /// Create a new config pointing at a fixed engine path, for testing
    #[cfg(test)]
    pub fn for_testing(luna2d_path: &Path) -> Self {
        Self {
            engine: EngineConfig {
                luna2d_path: Some(luna2d_path.to_path_buf()),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            ..Self::default()
        }
    }

    fn merge_env_vars(&mut self) {
        if let Ok(path) = std::env::var(LUNA2D_PATH_ENV) {
            if !path.is_empty() {
                self.engine.luna2d_path = Some(PathBuf::from(path));
            }
        }
    }

    /// Absolute engine installation path
    pub fn luna2d_path(&self) -> Result<PathBuf> {
        let path = self.engine.luna2d_path.as_ref().ok_or_else(|| {
            DeployError::Configuration(format!("{} environment value isn't set", LUNA2D_PATH_ENV))
        })?;

        if path.is_absolute() {
            Ok(path.clone())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}
