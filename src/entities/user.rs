//! User entity - A person tracked by the ledger.
//!
//! Users are identified by the opaque id handed out by the identity provider.
//! The four point counters are only ever changed through relative increments
//! issued by the ledger, so `current_points` always equals
//! `total_earned - total_redeemed - total_penalized` after a commit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Identity-provider user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name shown to other group members
    pub display_name: String,
    /// Contact email
    pub email: String,
    /// Spendable balance (may go negative through penalties)
    pub current_points: i64,
    /// Lifetime points earned
    pub total_earned: i64,
    /// Lifetime points spent on rewards
    pub total_redeemed: i64,
    /// Lifetime points deducted as penalties
    pub total_penalized: i64,
    /// When the user was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many group memberships
    #[sea_orm(has_many = "super::group_membership::Entity")]
    Memberships,
    /// One user has many transaction records
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::group_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
