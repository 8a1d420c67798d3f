//! Completion backend configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::GenerationParams;

/// Settings for the OpenAI-compatible completion backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Bearer key for the backend. Never logged.
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries before a stream opens
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Serve canned replies instead of calling the backend
    #[serde(default)]
    pub use_mock: bool,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sampling parameters sent with every request.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ValidationError::InvalidTopP);
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        if !self.use_mock && self.api_key.is_none() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            use_mock: false,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "qwen3-235b:strip_thinking_response=true".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_top_p() -> f32 {
    0.95
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> AiConfig {
        AiConfig {
            api_key: Some(Secret::new("sk-test".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.generation_params(), GenerationParams::default());
    }

    #[test]
    fn test_key_required_unless_mock() {
        assert_eq!(
            AiConfig::default().validate(),
            Err(ValidationError::MissingRequired("AI__API_KEY"))
        );

        let mock = AiConfig {
            use_mock: true,
            ..Default::default()
        };
        assert!(mock.validate().is_ok());
        assert!(keyed().validate().is_ok());
    }

    #[test]
    fn test_sampling_ranges() {
        let hot = AiConfig {
            temperature: 2.5,
            ..keyed()
        };
        assert_eq!(hot.validate(), Err(ValidationError::InvalidTemperature));

        let zero_p = AiConfig {
            top_p: 0.0,
            ..keyed()
        };
        assert_eq!(zero_p.validate(), Err(ValidationError::InvalidTopP));

        let no_tokens = AiConfig {
            max_tokens: 0,
            ..keyed()
        };
        assert_eq!(no_tokens.validate(), Err(ValidationError::InvalidMaxTokens));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", keyed());
        assert!(!rendered.contains("sk-test"));
    }
}
