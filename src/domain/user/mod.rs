//! User accounts, usage, and activity statistics.

mod account;

pub use account::{MostActiveFriend, UsageInfo, UserAccount, UserStats};
