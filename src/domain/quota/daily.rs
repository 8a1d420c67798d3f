//! Per-user daily message allowance with lazy reset.
//!
//! There is no background timer. The period rolls over the next time the
//! quota is looked at after `reset_at` has passed.

use serde::{Deserialize, Serialize};

use super::TierLimits;
use crate::domain::foundation::Timestamp;

/// Counter state as stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    pub messages_used_today: u32,
    pub reset_at: Timestamp,
}

/// Outcome of evaluating the quota for one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The send may proceed. `remaining` is `None` for unlimited tiers.
    Allow { remaining: Option<u32> },
    /// The daily limit has been reached.
    Deny { limit: u32 },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allow { .. })
    }
}

/// Result of `DailyQuota::check_and_reserve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    /// True when the period rolled over and the new state must be persisted.
    pub reset_applied: bool,
    pub decision: QuotaDecision,
}

impl DailyQuota {
    /// Fresh counter for a new account.
    pub fn starting_at(now: Timestamp, period_hours: i64) -> Self {
        Self {
            messages_used_today: 0,
            reset_at: now.plus_hours(period_hours),
        }
    }

    /// Rolls the period over if `now` is past `reset_at`.
    ///
    /// Returns true when a reset was applied.
    pub fn refresh(&mut self, now: Timestamp, period_hours: i64) -> bool {
        if now.is_after(&self.reset_at) {
            self.messages_used_today = 0;
            self.reset_at = now.plus_hours(period_hours);
            true
        } else {
            false
        }
    }

    /// Evaluates the limit against the current counter without mutating it.
    pub fn evaluate(&self, limits: &TierLimits) -> QuotaDecision {
        match limits.daily_messages {
            Some(limit) if self.messages_used_today >= limit => QuotaDecision::Deny { limit },
            Some(limit) => QuotaDecision::Allow {
                remaining: Some(limit - self.messages_used_today),
            },
            None => QuotaDecision::Allow { remaining: None },
        }
    }

    /// Applies any pending reset, then evaluates the limit.
    ///
    /// The counter itself is never incremented here. That happens only after
    /// an exchange has been persisted.
    pub fn check_and_reserve(
        &mut self,
        limits: &TierLimits,
        now: Timestamp,
        period_hours: i64,
    ) -> QuotaCheck {
        let reset_applied = self.refresh(now, period_hours);
        QuotaCheck {
            reset_applied,
            decision: self.evaluate(limits),
        }
    }

    /// The counter as it would read after a lazy reset, without changing self.
    pub fn effective(&self, now: Timestamp, period_hours: i64) -> DailyQuota {
        let mut view = *self;
        view.refresh(now, period_hours);
        view
    }
}
