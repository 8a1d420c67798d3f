//! Account handlers: provisioning, usage, statistics, and default friends.

mod ensure_user;
mod get_stats;
mod get_usage;
mod seed_default_friends;

pub use ensure_user::EnsureUserHandler;
pub use get_stats::GetStatsHandler;
pub use get_usage::GetUsageHandler;
pub use seed_default_friends::SeedDefaultFriendsHandler;
