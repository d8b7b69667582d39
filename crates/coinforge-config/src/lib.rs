//! Configuration discovery and schema for coinforge
//!
//! Tool configuration lives in `coinforge.toml`, discovered by walking
//! upward from the current directory. API keys are never stored in the
//! file; the config names the environment variable that holds them.
//!
//! ```toml
//! [llm]
//! provider = "anthropic"
//! request_timeout_secs = 120
//!
//! [llm.anthropic]
//! model = "claude-sonnet-4-5"
//! api_key_env = "ANTHROPIC_API_KEY"
//!
//! [output]
//! kit_dir = "launch-kits"
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use coinforge_utils::error::ConfigError;

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = "coinforge.toml";

/// Default per-invocation timeout for backend calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// LLM backend selection and per-provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider name: "anthropic" (default) or "openrouter".
    pub provider: Option<String>,
    /// Optional provider tried when the primary fails to construct.
    pub fallback_provider: Option<String>,
    /// Per-invocation timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    pub anthropic: Option<AnthropicConfig>,
    pub openrouter: Option<OpenRouterConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    pub model: Option<String>,
    /// Environment variable holding the API key (default ANTHROPIC_API_KEY).
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    pub model: Option<String>,
    /// Environment variable holding the API key (default OPENROUTER_API_KEY).
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Output locations for generated launch kits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory launch kits are written under (default `<home>/kits`).
    pub kit_dir: Option<Utf8PathBuf>,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file is missing and
    /// `ConfigError::InvalidFile` if it fails to parse.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_string(),
        })?;
        let config: Self =
            toml::from_str(&text).map_err(|e| ConfigError::InvalidFile(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Discover configuration by walking upward from `start` looking for
    /// `coinforge.toml`. Absence of a file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only when a file is found but invalid, or the
    /// directory walk itself fails.
    pub fn discover(start: &Utf8Path) -> Result<Self, ConfigError> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(CONFIG_FILE_NAME);
            if candidate.as_std_path().is_file() {
                debug!(path = %candidate, "Discovered configuration file");
                return Self::load_from(&candidate);
            }
            dir = d.parent();
        }
        debug!("No configuration file found; using defaults");
        Ok(Self::default())
    }

    /// Discover configuration starting from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Config::discover`].
    pub fn discover_from_cwd() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: e.to_string(),
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|p| ConfigError::DiscoveryFailed {
            reason: format!("current directory is not valid UTF-8: {}", p.display()),
        })?;
        Self::discover(&cwd)
    }

    /// Effective provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or("anthropic")
    }

    /// Effective per-invocation timeout.
    #[must_use]
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.llm
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = self.llm.provider.as_deref() {
            if !matches!(provider, "anthropic" | "openrouter") {
                return Err(ConfigError::InvalidValue {
                    key: "llm.provider".to_string(),
                    value: provider.to_string(),
                });
            }
        }
        if let Some(secs) = self.llm.request_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "llm.request_timeout_secs".to_string(),
                    value: "0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Minimal configuration for tests.
    #[doc(hidden)]
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Self::default()
    }
}
