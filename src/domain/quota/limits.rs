//! Tier-based limits.

use serde::{Deserialize, Serialize};

use super::SubscriptionTier;

/// Deployment-wide numbers that tier limits are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Daily message cap for the free tier.
    pub free_daily_messages: u32,
    /// Friend cap for the free tier.
    pub free_friends: u32,
    /// Friend cap for the premium tier.
    pub premium_friends: u32,
    /// Length of a quota period.
    pub reset_period_hours: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            free_daily_messages: 50,
            free_friends: 5,
            premium_friends: 50,
            reset_period_hours: 24,
        }
    }
}

impl QuotaPolicy {
    /// Resolves the limits for a tier.
    ///
    /// | Tier | Messages/day | Friends |
    /// |------|--------------|---------|
    /// | Free | 50 | 5 |
    /// | Premium | Unlimited | 50 |
    pub fn limits_for(&self, tier: SubscriptionTier) -> TierLimits {
        match tier {
            SubscriptionTier::Free => TierLimits {
                tier,
                daily_messages: Some(self.free_daily_messages),
                max_friends: Some(self.free_friends),
            },
            SubscriptionTier::Premium => TierLimits {
                tier,
                daily_messages: None,
                max_friends: Some(self.premium_friends),
            },
        }
    }
}

/// Limits in force for one tier. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub tier: SubscriptionTier,
    pub daily_messages: Option<u32>,
    pub max_friends: Option<u32>,
}

impl TierLimits {
    pub fn friend_limit_reached(&self, current_friends: u32) -> bool {
        self.max_friends
            .map(|max| current_friends >= max)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_has_50_messages_and_5_friends() {
        let limits = QuotaPolicy::default().limits_for(SubscriptionTier::Free);
        assert_eq!(limits.daily_messages, Some(50));
        assert_eq!(limits.max_friends, Some(5));
    }

    #[test]
    fn premium_tier_has_unlimited_messages() {
        let limits = QuotaPolicy::default().limits_for(SubscriptionTier::Premium);
        assert_eq!(limits.daily_messages, None);
        assert_eq!(limits.max_friends, Some(50));
    }

    #[test]
    fn friend_limit_is_inclusive() {
        let limits = QuotaPolicy::default().limits_for(SubscriptionTier::Free);
        assert!(!limits.friend_limit_reached(4));
        assert!(limits.friend_limit_reached(5));
    }
}
