//! Group penalty entity - Audit row for one applied penalty.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Applied penalty database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_penalties")]
pub struct Model {
    /// Unique identifier for the penalty
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group the penalty was applied in
    pub group_id: i64,
    /// Penalised member
    pub member_id: String,
    /// Type that was applied
    pub penalty_type_id: i64,
    /// Points deducted (snapshot of the type's value)
    pub amount: i64,
    /// Optional free-text reason
    pub reason: Option<String>,
    /// Admin user id
    pub applied_by: String,
    /// Admin display name at the time
    pub applied_by_name: String,
    /// When the penalty was applied
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `GroupPenalty` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each penalty references one type
    #[sea_orm(
        belongs_to = "super::penalty_type::Entity",
        from = "Column::PenaltyTypeId",
        to = "super::penalty_type::Column::Id"
    )]
    PenaltyType,
}

impl Related<super::penalty_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PenaltyType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
