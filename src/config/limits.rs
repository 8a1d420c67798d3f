//! Quota and context limits

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::DEFAULT_CONTEXT_WINDOW;
use crate::domain::quota::QuotaPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_free_daily_messages")]
    pub free_daily_messages: u32,

    #[serde(default = "default_free_friends")]
    pub free_friends: u32,

    #[serde(default = "default_premium_friends")]
    pub premium_friends: u32,

    /// Most recent messages included in each prompt
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    #[serde(default = "default_reset_period_hours")]
    pub reset_period_hours: i64,
}

impl LimitsConfig {
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            free_daily_messages: self.free_daily_messages,
            free_friends: self.free_friends,
            premium_friends: self.premium_friends,
            reset_period_hours: self.reset_period_hours,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("free_daily_messages", self.free_daily_messages > 0),
            ("free_friends", self.free_friends > 0),
            ("premium_friends", self.premium_friends > 0),
            ("context_window", self.context_window > 0),
            ("reset_period_hours", self.reset_period_hours > 0),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((name, _)) => Err(ValidationError::NonPositiveLimit(*name)),
            None => Ok(()),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_daily_messages: default_free_daily_messages(),
            free_friends: default_free_friends(),
            premium_friends: default_premium_friends(),
            context_window: default_context_window(),
            reset_period_hours: default_reset_period_hours(),
        }
    }
}

fn default_free_daily_messages() -> u32 {
    50
}

fn default_free_friends() -> u32 {
    5
}

fn default_premium_friends() -> u32 {
    50
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

fn default_reset_period_hours() -> i64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_policy() {
        let config = LimitsConfig::default();
        assert_eq!(config.quota_policy(), QuotaPolicy::default());
        assert_eq!(config.context_window, 30);
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let config = LimitsConfig {
            context_window: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::NonPositiveLimit("context_window"))
        );
    }
}
