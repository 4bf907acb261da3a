//! Engine configuration.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use taleweaver_core::{ResponseMode, SamplingOptions};
use taleweaver_error::{ConfigError, TaleweaverResult};
use taleweaver_prompt::PromptSettings;
use tracing::{debug, instrument};

fn default_context_window() -> usize {
    10_000
}

fn default_max_tokens() -> u32 {
    2_048
}

/// Engine settings, loaded from TOML with environment overrides.
///
/// # Example
///
/// ```toml
/// context_window = 10000
/// max_tokens = 2048
/// response_mode = "free_form"
///
/// [options]
/// temperature = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Prompt token budget before the model's own limit is applied
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Output token budget sent as `max_tokens`
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling options forwarded on every request
    #[serde(default)]
    pub options: SamplingOptions,
    /// Requested response mode for GM turns
    #[serde(default)]
    pub response_mode: ResponseMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            max_tokens: default_max_tokens(),
            options: SamplingOptions::default(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl Settings {
    /// Load settings with precedence: `TALEWEAVER_*` environment variables
    /// over `./taleweaver.toml` over built-in defaults. The file is
    /// optional.
    #[instrument]
    pub fn load() -> TaleweaverResult<Self> {
        debug!("Loading settings: env > taleweaver.toml > defaults");
        let settings: Settings = Config::builder()
            .add_source(File::with_name("taleweaver").required(false))
            .add_source(Environment::with_prefix("TALEWEAVER"))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to read settings: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error when the TOML is malformed or a value is out of
    /// range.
    pub fn from_toml(toml: &str) -> TaleweaverResult<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to read settings: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// The snapshot handed to the prompt builder.
    pub fn prompt_settings(&self) -> PromptSettings {
        PromptSettings {
            context_window: self.context_window,
            max_tokens: self.max_tokens,
        }
    }

    fn validate(&self) -> TaleweaverResult<()> {
        if self.context_window == 0 {
            return Err(ConfigError::new("context_window must be positive").into());
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::new("max_tokens must be positive").into());
        }
        Ok(())
    }
}
