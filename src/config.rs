/// Application configuration
///
/// Loaded from a TOML file. Every field has a default, so a missing file
/// (or a file with only a few keys) is fine.
///
/// Lookup order for the file:
/// 1. `--config <path>` on the command line
/// 2. `AI_COMPARE_BOATS_CONFIG` environment variable
/// 3. `<config_dir>/ai-compare-boats/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::ui::theme::ThemeMode;

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "AI_COMPARE_BOATS_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transform: TransformConfig,
    pub analysis: AnalysisConfig,
    pub lookup: LookupConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Image transform settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Payload width limit in pixels
    pub max_width: u32,
    /// JPEG quality in (0, 1]
    pub quality: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            quality: 0.7,
        }
    }
}

/// Analysis capability settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub timeout_ms: u64,
    /// Simulated latency of the bundled mock analyzer
    pub mock_latency_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            mock_latency_ms: 600,
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }
}

/// Comparable lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: ThemeMode,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base filter directive, e.g. "info" or "ai_compare_boats=debug"
    pub filter: String,
    /// Noisy platform crates capped at `error`
    pub quiet_targets: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            quiet_targets: ["wgpu_core", "wgpu_hal", "naga", "iced_wgpu", "winit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LoggingConfig {
    /// Full filter directive string for the subscriber
    pub fn directives(&self) -> String {
        let mut directives = vec![self.filter.clone()];
        directives.extend(self.quiet_targets.iter().map(|t| format!("{}=error", t)));
        directives.join(",")
    }
}

impl AppConfig {
    /// Load the config, falling back to defaults when no file exists.
    ///
    /// An explicitly requested file (flag or env var) must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Read and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate config text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Platform config file location:
    /// - Linux: ~/.config/ai-compare-boats/config.toml
    /// - macOS: ~/Library/Application Support/ai-compare-boats/config.toml
    /// - Windows: %APPDATA%\ai-compare-boats\config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ai-compare-boats").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transform.max_width == 0 {
            return Err(ConfigError::Invalid("transform.max_width must be positive".into()));
        }
        let quality = self.transform.quality;
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "transform.quality must be in (0, 1], got {}",
                quality
            )));
        }
        if self.analysis.timeout_ms == 0 {
            return Err(ConfigError::Invalid("analysis.timeout_ms must be positive".into()));
        }
        if self.lookup.timeout_ms == 0 {
            return Err(ConfigError::Invalid("lookup.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
