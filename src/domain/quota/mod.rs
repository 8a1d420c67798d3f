//! Subscription tiers and the daily message quota.

mod daily;
mod limits;
mod tier;

pub use daily::{DailyQuota, QuotaCheck, QuotaDecision};
pub use limits::{QuotaPolicy, TierLimits};
pub use tier::SubscriptionTier;
