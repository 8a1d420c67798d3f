//! Subscription tier definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription tier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Capped daily messages and a small friend list.
    #[default]
    Free,

    /// Unlimited messages.
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "premium" => Ok(SubscriptionTier::Premium),
            other => Err(ValidationError::invalid_format(
                "subscription_tier",
                format!("unknown tier '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&SubscriptionTier::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
    }

    #[test]
    fn tier_parses_from_storage_string() {
        assert_eq!("free".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Free);
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn only_premium_is_paid() {
        assert!(!SubscriptionTier::Free.is_paid());
        assert!(SubscriptionTier::Premium.is_paid());
    }
}
