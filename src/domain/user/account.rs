//! User account fields the chat pipeline reads and mutates.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FriendId, Timestamp, UserId};
use crate::domain::friend::Gender;
use crate::domain::quota::{DailyQuota, QuotaPolicy, SubscriptionTier};

/// A user as seen by the conversation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub tier: SubscriptionTier,
    pub quota: DailyQuota,
    pub default_friends_seeded: bool,
    pub created_at: Timestamp,
}

impl UserAccount {
    /// Creates a free-tier account with a fresh quota period.
    pub fn provision(id: UserId, name: Option<String>, now: Timestamp, policy: &QuotaPolicy) -> Self {
        Self {
            id,
            name,
            gender: None,
            tier: SubscriptionTier::Free,
            quota: DailyQuota::starting_at(now, policy.reset_period_hours),
            default_friends_seeded: false,
            created_at: now,
        }
    }

    /// Usage summary with the lazy reset applied to the view.
    pub fn usage(&self, policy: &QuotaPolicy, now: Timestamp) -> UsageInfo {
        let quota = self.quota.effective(now, policy.reset_period_hours);
        let limits = policy.limits_for(self.tier);
        UsageInfo {
            messages_used_today: quota.messages_used_today,
            daily_limit: limits.daily_messages,
            remaining: limits
                .daily_messages
                .map(|limit| limit.saturating_sub(quota.messages_used_today)),
            reset_at: quota.reset_at,
            tier: self.tier,
        }
    }
}

/// Current quota position for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub messages_used_today: u32,
    /// `None` when the tier is unlimited.
    pub daily_limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Timestamp,
    pub tier: SubscriptionTier,
}

/// Friend with the most messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MostActiveFriend {
    pub id: FriendId,
    pub name: String,
    pub message_count: u64,
}

/// Account-level activity numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_friends: u64,
    pub total_messages: u64,
    pub account_age_days: i64,
    pub most_active_friend: Option<MostActiveFriend>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(now: Timestamp) -> UserAccount {
        UserAccount::provision(
            UserId::new("user-1").unwrap(),
            Some("Ada".to_string()),
            now,
            &QuotaPolicy::default(),
        )
    }

    #[test]
    fn provision_starts_free_with_full_allowance() {
        let now = Timestamp::now();
        let user = account(now);

        assert_eq!(user.tier, SubscriptionTier::Free);
        assert_eq!(user.quota.messages_used_today, 0);
        assert_eq!(user.quota.reset_at, now.plus_hours(24));
        assert!(!user.default_friends_seeded);
    }

    #[test]
    fn usage_reports_remaining_for_free_tier() {
        let now = Timestamp::now();
        let mut user = account(now);
        user.quota.messages_used_today = 20;

        let usage = user.usage(&QuotaPolicy::default(), now);
        assert_eq!(usage.daily_limit, Some(50));
        assert_eq!(usage.remaining, Some(30));
    }

    #[test]
    fn usage_reads_stale_counter_as_zero() {
        let now = Timestamp::now();
        let mut user = account(now.minus_days(2));
        user.quota.messages_used_today = 50;

        let usage = user.usage(&QuotaPolicy::default(), now);
        assert_eq!(usage.messages_used_today, 0);
        assert!(usage.reset_at.is_after(&now));
    }

    #[test]
    fn usage_is_unlimited_for_premium() {
        let now = Timestamp::now();
        let mut user = account(now);
        user.tier = SubscriptionTier::Premium;

        let usage = user.usage(&QuotaPolicy::default(), now);
        assert_eq!(usage.daily_limit, None);
        assert_eq!(usage.remaining, None);
    }
}
