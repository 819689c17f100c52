//! Group business logic - Groups, memberships and the leaderboard.
//!
//! Creating a group makes its creator the first admin in the same database
//! transaction, so a group never exists without an admin.

use crate::{
    entities::{Group, GroupMembership, MemberRole, User, group, group_membership, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// One row of a group leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Member's user id
    pub user_id: String,
    /// Member's display name
    pub display_name: String,
    /// Role in the group
    pub role: MemberRole,
    /// Points earned in the group
    pub points_earned: i64,
    /// Earned minus redeemed minus penalised, in the group
    pub net_points: i64,
}

/// Creates a group and registers `created_by` as its admin.
pub async fn create_group(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
    created_by: &str,
) -> Result<group::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Group name cannot be empty"));
    }

    let txn = db.begin().await?;

    crate::core::user::require_user(&txn, created_by).await?;

    let now = chrono::Utc::now();
    let group = group::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        created_by: Set(created_by.to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_membership(&txn, group.id, created_by, MemberRole::Admin).await?;

    txn.commit().await?;

    info!(group_id = group.id, admin = created_by, "Created group {}", group.name);
    Ok(group)
}

async fn insert_membership<C>(
    db: &C,
    group_id: i64,
    user_id: &str,
    role: MemberRole,
) -> Result<group_membership::Model>
where
    C: ConnectionTrait,
{
    let membership = group_membership::ActiveModel {
        group_id: Set(group_id),
        user_id: Set(user_id.to_string()),
        role: Set(role),
        points_earned: Set(0),
        points_redeemed: Set(0),
        points_penalized: Set(0),
        joined_at: Set(chrono::Utc::now()),
    };

    membership.insert(db).await.map_err(Into::into)
}

/// Finds a group by id.
pub async fn get_group_by_id<C>(db: &C, group_id: i64) -> Result<Option<group::Model>>
where
    C: ConnectionTrait,
{
    Group::find_by_id(group_id).one(db).await.map_err(Into::into)
}

/// Finds a group by its exact name.
pub async fn get_group_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<group::Model>> {
    Group::find()
        .filter(group::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds an existing user to an existing group.
///
/// Fails with `Validation` if the user is already a member.
pub async fn add_member(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: &str,
    role: MemberRole,
) -> Result<group_membership::Model> {
    let txn = db.begin().await?;

    get_group_by_id(&txn, group_id)
        .await?
        .ok_or_else(|| Error::not_found("Group", group_id))?;
    crate::core::user::require_user(&txn, user_id).await?;

    if get_membership(&txn, group_id, user_id).await?.is_some() {
        return Err(Error::validation(format!(
            "User {user_id} is already a member of group {group_id}"
        )));
    }

    let membership = insert_membership(&txn, group_id, user_id, role).await?;
    txn.commit().await?;

    info!(group_id, user_id, %role, "Added group member");
    Ok(membership)
}

/// Finds the membership of `user_id` in `group_id`.
pub async fn get_membership<C>(
    db: &C,
    group_id: i64,
    user_id: &str,
) -> Result<Option<group_membership::Model>>
where
    C: ConnectionTrait,
{
    GroupMembership::find_by_id((group_id, user_id.to_string()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all memberships of a group, oldest first.
pub async fn get_group_members(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<group_membership::Model>> {
    GroupMembership::find()
        .filter(group_membership::Column::GroupId.eq(group_id))
        .order_by_asc(group_membership::Column::JoinedAt)
        .order_by_asc(group_membership::Column::UserId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether `user_id` is an admin of `group_id`.
pub async fn is_group_admin(db: &DatabaseConnection, group_id: i64, user_id: &str) -> Result<bool> {
    Ok(get_membership(db, group_id, user_id)
        .await?
        .is_some_and(|m| m.role == MemberRole::Admin))
}

/// Builds the group leaderboard, highest net points first.
///
/// Ties are broken by user id so the order is stable.
pub async fn leaderboard(db: &DatabaseConnection, group_id: i64) -> Result<Vec<LeaderboardEntry>> {
    let rows: Vec<(group_membership::Model, Option<user::Model>)> = GroupMembership::find()
        .filter(group_membership::Column::GroupId.eq(group_id))
        .find_also_related(User)
        .all(db)
        .await?;

    let mut entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .map(|(membership, user)| LeaderboardEntry {
            display_name: user.map_or_else(|| membership.user_id.clone(), |u| u.display_name),
            net_points: membership.net_points(),
            points_earned: membership.points_earned,
            role: membership.role,
            user_id: membership.user_id,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.net_points
            .cmp(&a.net_points)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    Ok(entries)
}
