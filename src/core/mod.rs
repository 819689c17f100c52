//! Core business logic - framework-agnostic operations over the entities.
//!
//! [`ledger`] is the only module that changes point balances. The other
//! modules manage the records the ledger reads (tasks, penalty types, rewards,
//! memberships) and expose read models.

/// The atomic points ledger
pub mod ledger;

/// Groups, memberships and leaderboards
pub mod group;
/// Penalty types and applied penalties
pub mod penalty;
/// Member reports
pub mod report;
/// Rewards (prizes)
pub mod reward;
/// Tasks and task completions
pub mod task;
/// Transaction history queries
pub mod transaction;
/// User registration and lookups
pub mod user;
