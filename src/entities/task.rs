//! Task entity - An admin-defined chore worth a fixed number of points.
//!
//! Tasks are deactivated rather than deleted so that completions and
//! transaction descriptions keep pointing at a real row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Unique identifier for the task
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group the task belongs to
    pub group_id: i64,
    /// Short title, copied into transaction descriptions
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Points awarded for one approved completion
    pub points: i64,
    /// Inactive tasks cannot receive new completions
    pub is_active: bool,
    /// Admin who created the task
    pub created_by: String,
    /// When the task was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Task and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each task belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// One task has many completions
    #[sea_orm(has_many = "super::task_completion::Entity")]
    Completions,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::task_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
