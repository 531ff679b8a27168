//! Configuration management for the survival prediction service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the single origin allowed by CORS.
pub const ALLOW_ORIGIN_VAR: &str = "ALLOW_ORIGIN";

/// Prefix for environment overrides, e.g. `TITANIC_SERVER__PORT=9000`.
const ENV_PREFIX: &str = "TITANIC";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub models: ModelsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The only origin permitted to call the API. `None` grants no cross-origin access.
    pub allow_origin: Option<String>,
}

/// Model artifact locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory containing the ONNX model files
    pub models_dir: String,
    /// Logistic regression artifact file name
    pub logistic_regression: String,
    /// Random forest artifact file name
    pub random_forest: String,
    /// Gradient-boosted ensemble artifact file name
    pub ensemble: String,
    /// Number of intra-op threads per ONNX session
    pub onnx_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: "../models".to_string(),
            logistic_regression: "logistic_regression_model.onnx".to_string(),
            random_forest: "random_forest_model.onnx".to_string(),
            ensemble: "xgboost_model.onnx".to_string(),
            onnx_threads: 1,
        }
    }
}

impl ModelsConfig {
    pub fn logistic_regression_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.logistic_regression)
    }

    pub fn random_forest_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.random_forest)
    }

    pub fn ensemble_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.ensemble)
    }
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between logged summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 60,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/config.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, layered under environment overrides.
    ///
    /// The file is optional; every field has a built-in default. `ALLOW_ORIGIN`
    /// takes precedence over `cors.allow_origin` from any other source.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "cors.allow_origin",
                std::env::var(ALLOW_ORIGIN_VAR)
                    .ok()
                    .filter(|origin| !origin.is_empty()),
            )
            .context("Failed to apply ALLOW_ORIGIN override")?
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
