//! Transaction entity - The append-only audit log of point movements.
//!
//! Rows are inserted by the ledger in the same database transaction as the
//! balance change they describe, and are never updated or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of point movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionType {
    /// Points added (task approval or direct award)
    #[sea_orm(string_value = "earn")]
    Earn,
    /// Points spent on a reward
    #[sea_orm(string_value = "redeem")]
    Redeem,
    /// Points deducted by an admin
    #[sea_orm(string_value = "penalty")]
    Penalty,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earn => f.write_str("earn"),
            Self::Redeem => f.write_str("redeem"),
            Self::Penalty => f.write_str("penalty"),
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose balance moved
    pub user_id: String,
    /// Group the movement happened in, if any
    pub group_id: Option<i64>,
    /// `"earn"`, `"redeem"` or `"penalty"`
    pub transaction_type: TransactionType,
    /// Always positive; the type gives the direction
    pub amount: i64,
    /// Human-readable snapshot, e.g. `Completed task: Dishes`
    pub description: String,
    /// When the record was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
