//! Reward entity - A prize members can redeem points for.
//!
//! Each reward belongs to one group and has a fixed point cost.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    /// Unique identifier for the reward
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group offering the reward
    pub group_id: i64,
    /// Name of the reward (e.g., "Movie night")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Points it costs to redeem
    pub cost: i64,
    /// Inactive rewards cannot be redeemed
    pub is_active: bool,
    /// When the reward was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Reward and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reward belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
