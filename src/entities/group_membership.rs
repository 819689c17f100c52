//! Group membership entity - A user's role and group-scoped point mirror.
//!
//! The point columns mirror the user-level totals but only count activity
//! that happened inside this group.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a member inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MemberRole {
    /// Can define tasks, rewards and penalties, and move points
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member
    #[sea_orm(string_value = "member")]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Member => f.write_str("member"),
        }
    }
}

/// Group membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_memberships")]
pub struct Model {
    /// Group id (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,
    /// User id (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Role of the user in this group
    pub role: MemberRole,
    /// Points earned inside this group
    pub points_earned: i64,
    /// Points spent on this group's rewards
    pub points_redeemed: i64,
    /// Points deducted by this group's penalties
    pub points_penalized: i64,
    /// When the user joined
    pub joined_at: DateTimeUtc,
}

impl Model {
    /// Net points held inside this group.
    #[must_use]
    pub const fn net_points(&self) -> i64 {
        self.points_earned - self.points_redeemed - self.points_penalized
    }
}

/// Defines relationships between `GroupMembership` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// Each membership belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
