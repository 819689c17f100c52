//! Task completion entity - A member's claim of having done a task.
//!
//! `points_awarded` is a snapshot of the task's value at submission time.
//! Status moves once from `pending` to either terminal state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review state of a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CompletionStatus {
    /// Waiting for an admin
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Points were awarded
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Turned down, no points
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl CompletionStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Approved => f.write_str("approved"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Task completion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_completions")]
pub struct Model {
    /// Unique identifier for the completion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Task that was completed
    pub task_id: i64,
    /// Group of the task
    pub group_id: i64,
    /// Member who completed the task
    pub user_id: String,
    /// Points snapshot taken at submission
    pub points_awarded: i64,
    /// Review state
    pub status: CompletionStatus,
    /// Optional note from the member
    pub notes: Option<String>,
    /// When the completion was submitted
    pub submitted_at: DateTimeUtc,
    /// Admin user id that resolved the completion
    pub resolved_by: Option<String>,
    /// Admin display name at resolution time
    pub resolved_by_name: Option<String>,
    /// When the completion was resolved
    pub resolved_at: Option<DateTimeUtc>,
    /// Reason given on rejection
    pub rejection_reason: Option<String>,
}

/// Defines relationships between `TaskCompletion` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each completion belongs to one task
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id"
    )]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
