//! Penalty type entity - A named, fixed-size deduction an admin can apply.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Penalty type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "penalty_types")]
pub struct Model {
    /// Unique identifier for the penalty type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group that defines the penalty
    pub group_id: i64,
    /// Short name, copied into transaction descriptions
    pub name: String,
    /// Points deducted per application
    pub points: i64,
    /// Optional description
    pub description: Option<String>,
    /// Inactive types cannot be applied
    pub is_active: bool,
    /// When the type was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `PenaltyType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each penalty type belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// One type has many applied penalties
    #[sea_orm(has_many = "super::group_penalty::Entity")]
    Penalties,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::group_penalty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Penalties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
