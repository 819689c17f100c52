//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod group;
pub mod group_membership;
pub mod group_penalty;
pub mod penalty_type;
pub mod reward;
pub mod task;
pub mod task_completion;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use group::{Column as GroupColumn, Entity as Group, Model as GroupModel};
pub use group_membership::{
    Column as GroupMembershipColumn, Entity as GroupMembership, MemberRole,
    Model as GroupMembershipModel,
};
pub use group_penalty::{
    Column as GroupPenaltyColumn, Entity as GroupPenalty, Model as GroupPenaltyModel,
};
pub use penalty_type::{
    Column as PenaltyTypeColumn, Entity as PenaltyType, Model as PenaltyTypeModel,
};
pub use reward::{Column as RewardColumn, Entity as Reward, Model as RewardModel};
pub use task::{Column as TaskColumn, Entity as Task, Model as TaskModel};
pub use task_completion::{
    Column as TaskCompletionColumn, CompletionStatus, Entity as TaskCompletion,
    Model as TaskCompletionModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
