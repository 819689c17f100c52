//! Points ledger - The only code path that moves points.
//!
//! Every entry operation opens one database transaction and performs, inside
//! it, a relative increment of the user's counters, the same increment on the
//! group membership mirror (when the user belongs to the group), and the
//! insertion of one transaction record. Task approval additionally swaps the
//! completion status, and penalties add a `group_penalties` audit row. If any
//! step fails the transaction is dropped uncommitted and nothing is visible.
//!
//! Counters are only written as `col = col + delta`, never as an absolute value
//! computed from an earlier read, so concurrent operations on the same user
//! commute: the final totals are the sum of every committed movement whatever
//! the commit order.

use crate::{
    core::task::resolve_completion,
    entities::{
        CompletionStatus, GroupMembership, PenaltyType, Reward, Task, TransactionType, User,
        group_membership, group_penalty, penalty_type, reward, task, task_completion,
        transaction, user,
    },
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// The admin performing an operation: user id plus display name at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor<'a> {
    /// Identity-provider user id
    pub id: &'a str,
    /// Display name, copied into descriptions and audit rows
    pub name: &'a str,
}

impl<'a> Actor<'a> {
    /// Creates an actor from an id and a display name.
    #[must_use]
    pub const fn new(id: &'a str, name: &'a str) -> Self {
        Self { id, name }
    }
}

/// Why a direct award was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardReason {
    /// The award stands in for a completed task of the same group; an approved
    /// completion is recorded alongside it as an audit entry. The description
    /// uses the task's stored title.
    TaskLinked {
        /// Task the award is for
        task_id: i64,
        /// Title the caller expects; the stored title is used if they differ
        task_title: String,
    },
    /// A discretionary award by an admin.
    AdHoc,
}

/// A point movement with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMovement {
    /// Adds to `current_points` and `total_earned`
    Earn(i64),
    /// Subtracts from `current_points`, adds to `total_redeemed`
    Redeem(i64),
    /// Subtracts from `current_points`, adds to `total_penalized`
    Penalty(i64),
}

impl PointMovement {
    /// Unsigned size of the movement.
    #[must_use]
    pub const fn amount(self) -> i64 {
        match self {
            Self::Earn(amount) | Self::Redeem(amount) | Self::Penalty(amount) => amount,
        }
    }

    /// Signed change applied to `current_points`.
    #[must_use]
    pub const fn balance_delta(self) -> i64 {
        match self {
            Self::Earn(amount) => amount,
            Self::Redeem(amount) | Self::Penalty(amount) => -amount,
        }
    }

    /// Type of the transaction record written for this movement.
    #[must_use]
    pub const fn transaction_type(self) -> TransactionType {
        match self {
            Self::Earn(_) => TransactionType::Earn,
            Self::Redeem(_) => TransactionType::Redeem,
            Self::Penalty(_) => TransactionType::Penalty,
        }
    }

    const fn user_total_column(self) -> user::Column {
        match self {
            Self::Earn(_) => user::Column::TotalEarned,
            Self::Redeem(_) => user::Column::TotalRedeemed,
            Self::Penalty(_) => user::Column::TotalPenalized,
        }
    }

    const fn membership_column(self) -> group_membership::Column {
        match self {
            Self::Earn(_) => group_membership::Column::PointsEarned,
            Self::Redeem(_) => group_membership::Column::PointsRedeemed,
            Self::Penalty(_) => group_membership::Column::PointsPenalized,
        }
    }
}

/// Input of the shared atomic write.
#[derive(Debug, Clone)]
pub(crate) struct LedgerWrite<'a> {
    pub user_id: &'a str,
    pub group_id: Option<i64>,
    pub movement: PointMovement,
    pub description: String,
}

/// What a committed ledger operation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    /// The appended transaction record
    pub transaction: transaction::Model,
    /// The user as of the commit
    pub user: user::Model,
    /// The membership as of the commit, if the user belongs to the group
    pub membership: Option<group_membership::Model>,
}

/// Result of approving a task completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskApproval {
    /// The completion, now `approved`
    pub completion: task_completion::Model,
    /// The point movement
    pub receipt: LedgerReceipt,
}

/// Result of a direct award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAward {
    /// The synthesised approved completion for task-linked awards
    pub completion: Option<task_completion::Model>,
    /// The point movement
    pub receipt: LedgerReceipt,
}

/// Result of applying a penalty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPenalty {
    /// The audit row
    pub penalty: group_penalty::Model,
    /// The point movement
    pub receipt: LedgerReceipt,
}

/// Applies one point movement on `db`, which callers pass as an open transaction.
///
/// 1. Relative update of the user's balance and matching lifetime total. A
///    redemption only matches while `current_points >= amount`.
/// 2. Relative update of the (group, user) membership mirror, if that row
///    exists.
/// 3. Insertion of the transaction record.
pub(crate) async fn apply_movement<C>(db: &C, write: LedgerWrite<'_>) -> Result<LedgerReceipt>
where
    C: ConnectionTrait,
{
    let movement = write.movement;
    let amount = movement.amount();
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let total_column = movement.user_total_column();
    let mut user_update = User::update_many()
        .col_expr(
            user::Column::CurrentPoints,
            Expr::col(user::Column::CurrentPoints).add(movement.balance_delta()),
        )
        .col_expr(total_column, Expr::col(total_column).add(amount))
        .filter(user::Column::Id.eq(write.user_id));
    if let PointMovement::Redeem(cost) = movement {
        user_update = user_update.filter(user::Column::CurrentPoints.gte(cost));
    }

    if user_update.exec(db).await?.rows_affected == 0 {
        let user = crate::core::user::require_user(db, write.user_id).await?;
        return Err(Error::InsufficientPoints {
            current: user.current_points,
            required: amount,
        });
    }

    let membership = match write.group_id {
        Some(group_id) => mirror_into_membership(db, group_id, write.user_id, movement).await?,
        None => None,
    };

    let transaction = transaction::ActiveModel {
        user_id: Set(write.user_id.to_string()),
        group_id: Set(write.group_id),
        transaction_type: Set(movement.transaction_type()),
        amount: Set(amount),
        description: Set(write.description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let user = crate::core::user::require_user(db, write.user_id).await?;

    Ok(LedgerReceipt {
        transaction,
        user,
        membership,
    })
}

async fn mirror_into_membership<C>(
    db: &C,
    group_id: i64,
    user_id: &str,
    movement: PointMovement,
) -> Result<Option<group_membership::Model>>
where
    C: ConnectionTrait,
{
    let column = movement.membership_column();
    let result = GroupMembership::update_many()
        .col_expr(column, Expr::col(column).add(movement.amount()))
        .filter(group_membership::Column::GroupId.eq(group_id))
        .filter(group_membership::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!(
            group_id,
            user_id, "User is not a member of the group; skipping membership mirror"
        );
        return Ok(None);
    }

    crate::core::group::get_membership(db, group_id, user_id).await
}

/// Approves a pending task completion and awards its points to the submitter.
///
/// The task title is looked up now and copied into the description, so
/// renaming the task later does not rewrite history.
///
/// # Errors
/// * `NotFound` if the completion (or its task) does not exist
/// * `AlreadyProcessed` if the completion is no longer pending
/// * `Database` if the store fails; nothing was applied
#[instrument(skip(db, approver), fields(approver_id = approver.id))]
pub async fn award_for_task_completion(
    db: &DatabaseConnection,
    completion_id: i64,
    approver: &Actor<'_>,
) -> Result<TaskApproval> {
    let txn = db.begin().await?;

    let completion =
        resolve_completion(&txn, completion_id, CompletionStatus::Approved, approver, None)
            .await?;

    let task = crate::core::task::get_task_by_id(&txn, completion.task_id)
        .await?
        .ok_or_else(|| Error::not_found("Task", completion.task_id))?;

    let receipt = apply_movement(
        &txn,
        LedgerWrite {
            user_id: &completion.user_id,
            group_id: Some(completion.group_id),
            movement: PointMovement::Earn(completion.points_awarded),
            description: format!("Completed task: {}", task.title),
        },
    )
    .await?;

    txn.commit().await?;

    info!(
        completion_id,
        user_id = %completion.user_id,
        points = completion.points_awarded,
        "Approved task completion"
    );
    Ok(TaskApproval {
        completion,
        receipt,
    })
}

/// Awards `points` to a group member without a prior completion.
///
/// For [`AwardReason::TaskLinked`] an already approved completion is inserted
/// in the same transaction as an after-the-fact audit entry.
///
/// # Errors
/// * `InvalidAmount` if `points <= 0`
/// * `NotFound` if the member does not exist, or the linked task does not
///   exist in `group_id`
/// * `Database` if the store fails; nothing was applied
#[instrument(skip(db, admin, reason), fields(admin_id = admin.id))]
pub async fn award_direct(
    db: &DatabaseConnection,
    group_id: i64,
    member_id: &str,
    admin: &Actor<'_>,
    points: i64,
    reason: AwardReason,
) -> Result<DirectAward> {
    if points <= 0 {
        return Err(Error::InvalidAmount { amount: points });
    }

    let txn = db.begin().await?;

    let (description, linked_task) = match &reason {
        AwardReason::TaskLinked {
            task_id,
            task_title,
        } => {
            let task = Task::find_by_id(*task_id)
                .filter(task::Column::GroupId.eq(group_id))
                .one(&txn)
                .await?
                .ok_or_else(|| Error::not_found("Task", *task_id))?;
            if task.title != *task_title {
                warn!(
                    task_id,
                    requested = %task_title,
                    stored = %task.title,
                    "Award names a different task title; using the stored one"
                );
            }
            (format!("Task completed: {}", task.title), Some(task))
        }
        AwardReason::AdHoc => (format!("Points awarded by {}", admin.name), None),
    };

    let receipt = apply_movement(
        &txn,
        LedgerWrite {
            user_id: member_id,
            group_id: Some(group_id),
            movement: PointMovement::Earn(points),
            description,
        },
    )
    .await?;

    let completion = match linked_task {
        Some(task) => {
            let now = chrono::Utc::now();
            let completion = task_completion::ActiveModel {
                task_id: Set(task.id),
                group_id: Set(group_id),
                user_id: Set(member_id.to_string()),
                points_awarded: Set(points),
                status: Set(CompletionStatus::Approved),
                notes: Set(None),
                submitted_at: Set(now),
                resolved_by: Set(Some(admin.id.to_string())),
                resolved_by_name: Set(Some(admin.name.to_string())),
                resolved_at: Set(Some(now)),
                rejection_reason: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            Some(completion)
        }
        None => None,
    };

    txn.commit().await?;

    info!(group_id, member_id, points, "Awarded points directly");
    Ok(DirectAward {
        completion,
        receipt,
    })
}

/// Deducts the points of an active penalty type from a group member.
///
/// The deduction is booked as `total_penalized` / `points_penalized` with a
/// `penalty` transaction record, never as a redemption.
///
/// # Errors
/// * `NotFound` if the penalty type is missing, inactive, or belongs to
///   another group, or if the member does not exist
/// * `Database` if the store fails; nothing was applied
#[instrument(skip(db, admin, reason), fields(admin_id = admin.id))]
pub async fn apply_penalty(
    db: &DatabaseConnection,
    group_id: i64,
    member_id: &str,
    penalty_type_id: i64,
    admin: &Actor<'_>,
    reason: Option<String>,
) -> Result<AppliedPenalty> {
    let txn = db.begin().await?;

    let penalty_type = PenaltyType::find_by_id(penalty_type_id)
        .filter(penalty_type::Column::IsActive.eq(true))
        .filter(penalty_type::Column::GroupId.eq(group_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Penalty type", penalty_type_id))?;

    let reason = reason.filter(|r| !r.trim().is_empty());
    let description = match &reason {
        Some(reason) => format!("Penalty: {} - {reason}", penalty_type.name),
        None => format!("Penalty: {}", penalty_type.name),
    };

    let receipt = apply_movement(
        &txn,
        LedgerWrite {
            user_id: member_id,
            group_id: Some(group_id),
            movement: PointMovement::Penalty(penalty_type.points),
            description,
        },
    )
    .await?;

    let penalty = group_penalty::ActiveModel {
        group_id: Set(group_id),
        member_id: Set(member_id.to_string()),
        penalty_type_id: Set(penalty_type.id),
        amount: Set(penalty_type.points),
        reason: Set(reason),
        applied_by: Set(admin.id.to_string()),
        applied_by_name: Set(admin.name.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        group_id,
        member_id,
        penalty_type_id,
        points = penalty.amount,
        "Applied penalty"
    );
    Ok(AppliedPenalty { penalty, receipt })
}

/// Spends a member's points on one of the group's active rewards.
///
/// # Errors
/// * `NotFound` if the reward is missing, inactive, or belongs to another
///   group, or if the member does not exist
/// * `InsufficientPoints` if the member cannot afford the reward
/// * `Database` if the store fails; nothing was applied
#[instrument(skip(db))]
pub async fn redeem_reward(
    db: &DatabaseConnection,
    group_id: i64,
    member_id: &str,
    reward_id: i64,
) -> Result<LedgerReceipt> {
    let txn = db.begin().await?;

    let reward = Reward::find_by_id(reward_id)
        .filter(reward::Column::IsActive.eq(true))
        .filter(reward::Column::GroupId.eq(group_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Reward", reward_id))?;

    let receipt = apply_movement(
        &txn,
        LedgerWrite {
            user_id: member_id,
            group_id: Some(group_id),
            movement: PointMovement::Redeem(reward.cost),
            description: format!("Redeemed reward: {}", reward.name),
        },
    )
    .await?;

    txn.commit().await?;

    info!(group_id, member_id, reward_id, cost = reward.cost, "Redeemed reward");
    Ok(receipt)
}
