//! Task business logic - Tasks and the completion review workflow.
//!
//! A completion is a member's claim that a task was done. It starts `pending`
//! and is resolved exactly once, either by the ledger (approval, which moves
//! points) or by [`reject_completion`] (which never touches balances). Both
//! paths go through [`resolve_completion`], a compare-and-swap on the status
//! column, so two admins racing on the same completion cannot both win.

use crate::{
    core::{group::get_membership, ledger::Actor},
    entities::{CompletionStatus, Task, TaskCompletion, task, task_completion},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{info, warn};

/// Stored when a completion is rejected without a reason.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Creates a task worth `points` in `group_id`.
pub async fn create_task(
    db: &DatabaseConnection,
    group_id: i64,
    title: String,
    description: Option<String>,
    points: i64,
    created_by: &str,
) -> Result<task::Model> {
    if title.trim().is_empty() {
        return Err(Error::validation("Task title cannot be empty"));
    }
    if points <= 0 {
        return Err(Error::InvalidAmount { amount: points });
    }

    crate::core::group::get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::not_found("Group", group_id))?;

    let task = task::ActiveModel {
        group_id: Set(group_id),
        title: Set(title.trim().to_string()),
        description: Set(description),
        points: Set(points),
        is_active: Set(true),
        created_by: Set(created_by.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    task.insert(db).await.map_err(Into::into)
}

/// Finds a task by id, including inactive ones.
pub async fn get_task_by_id<C>(db: &C, task_id: i64) -> Result<Option<task::Model>>
where
    C: ConnectionTrait,
{
    Task::find_by_id(task_id).one(db).await.map_err(Into::into)
}

/// Lists the active tasks of a group, ordered alphabetically by title.
pub async fn get_active_tasks(db: &DatabaseConnection, group_id: i64) -> Result<Vec<task::Model>> {
    Task::find()
        .filter(task::Column::GroupId.eq(group_id))
        .filter(task::Column::IsActive.eq(true))
        .order_by_asc(task::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Stops a task from accepting new completions.
///
/// Pending completions of the task can still be approved or rejected.
pub async fn deactivate_task(db: &DatabaseConnection, task_id: i64) -> Result<task::Model> {
    let task = get_task_by_id(db, task_id)
        .await?
        .ok_or_else(|| Error::not_found("Task", task_id))?;

    let mut active_model: task::ActiveModel = task.into();
    active_model.is_active = Set(false);
    active_model.update(db).await.map_err(Into::into)
}

/// Records that `user_id` completed `task_id`, pending admin review.
///
/// The task's current point value is copied into the completion, so later
/// edits to the task do not change what this completion is worth.
pub async fn submit_completion(
    db: &DatabaseConnection,
    task_id: i64,
    user_id: &str,
    notes: Option<String>,
) -> Result<task_completion::Model> {
    let task = get_task_by_id(db, task_id)
        .await?
        .ok_or_else(|| Error::not_found("Task", task_id))?;

    if !task.is_active {
        return Err(Error::validation(format!(
            "Task '{}' is no longer active",
            task.title
        )));
    }

    if get_membership(db, task.group_id, user_id).await?.is_none() {
        return Err(Error::validation(format!(
            "User {user_id} is not a member of group {}",
            task.group_id
        )));
    }

    let completion = task_completion::ActiveModel {
        task_id: Set(task.id),
        group_id: Set(task.group_id),
        user_id: Set(user_id.to_string()),
        points_awarded: Set(task.points),
        status: Set(CompletionStatus::Pending),
        notes: Set(notes),
        submitted_at: Set(chrono::Utc::now()),
        resolved_by: Set(None),
        resolved_by_name: Set(None),
        resolved_at: Set(None),
        rejection_reason: Set(None),
        ..Default::default()
    };

    let completion = completion.insert(db).await?;
    info!(
        completion_id = completion.id,
        task_id, user_id, "Submitted task completion"
    );
    Ok(completion)
}

/// Finds a completion by id.
pub async fn get_completion_by_id<C>(
    db: &C,
    completion_id: i64,
) -> Result<Option<task_completion::Model>>
where
    C: ConnectionTrait,
{
    TaskCompletion::find_by_id(completion_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the completions of a group still waiting for review, oldest first.
pub async fn get_pending_completions(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<task_completion::Model>> {
    TaskCompletion::find()
        .filter(task_completion::Column::GroupId.eq(group_id))
        .filter(task_completion::Column::Status.eq(CompletionStatus::Pending))
        .order_by_asc(task_completion::Column::SubmittedAt)
        .order_by_asc(task_completion::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a pending completion to `outcome` and stamps the resolver.
///
/// The update only matches rows still `pending`. When nothing matched, the
/// completion is reloaded to tell a missing row (`NotFound`) from one that
/// was already resolved (`AlreadyProcessed`).
pub(crate) async fn resolve_completion<C>(
    db: &C,
    completion_id: i64,
    outcome: CompletionStatus,
    resolver: &Actor<'_>,
    rejection_reason: Option<String>,
) -> Result<task_completion::Model>
where
    C: ConnectionTrait,
{
    let mut update = TaskCompletion::update_many()
        .col_expr(
            task_completion::Column::Status,
            Expr::value(outcome.to_value()),
        )
        .col_expr(
            task_completion::Column::ResolvedBy,
            Expr::value(resolver.id.to_string()),
        )
        .col_expr(
            task_completion::Column::ResolvedByName,
            Expr::value(resolver.name.to_string()),
        )
        .col_expr(
            task_completion::Column::ResolvedAt,
            Expr::value(chrono::Utc::now()),
        );
    if let Some(reason) = rejection_reason {
        update = update.col_expr(task_completion::Column::RejectionReason, Expr::value(reason));
    }

    let result = update
        .filter(task_completion::Column::Id.eq(completion_id))
        .filter(task_completion::Column::Status.eq(CompletionStatus::Pending))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let existing = get_completion_by_id(db, completion_id)
            .await?
            .ok_or_else(|| Error::not_found("Task completion", completion_id))?;
        warn!(
            completion_id,
            status = %existing.status,
            "Refusing to resolve an already processed completion"
        );
        return Err(Error::AlreadyProcessed {
            completion_id,
            status: existing.status,
        });
    }

    get_completion_by_id(db, completion_id)
        .await?
        .ok_or_else(|| Error::not_found("Task completion", completion_id))
}

/// Rejects a pending completion. Balances are left untouched.
///
/// A missing reason is stored as [`DEFAULT_REJECTION_REASON`].
pub async fn reject_completion(
    db: &DatabaseConnection,
    completion_id: i64,
    approver: &Actor<'_>,
    reason: Option<String>,
) -> Result<task_completion::Model> {
    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

    let completion = resolve_completion(
        db,
        completion_id,
        CompletionStatus::Rejected,
        approver,
        Some(reason),
    )
    .await?;

    info!(completion_id, approver = approver.id, "Rejected task completion");
    Ok(completion)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_task_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_task(&db, 1, " ".to_string(), None, 10, "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_task(&db, 1, "Dishes".to_string(), None, 0, "admin").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 0 }));

        let result = create_task(&db, 1, "Dishes".to_string(), None, -5, "admin").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: -5 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_active_tasks_exclude_deactivated() -> Result<()> {
        let ctx = setup_with_group().await?;
        let dishes = create_test_task(&ctx, "Dishes", 20).await?;
        create_test_task(&ctx, "Laundry", 15).await?;

        deactivate_task(&ctx.db, dishes.id).await?;

        let active = get_active_tasks(&ctx.db, ctx.group.id).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Laundry");
        assert!(!get_task_by_id(&ctx.db, dishes.id).await?.unwrap().is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_completion_snapshots_points() -> Result<()> {
        let ctx = setup_with_group().await?;
        let task = create_test_task(&ctx, "Dishes", 20).await?;

        let completion =
            submit_completion(&ctx.db, task.id, &ctx.member.id, Some("done".to_string())).await?;
        assert_eq!(completion.status, CompletionStatus::Pending);
        assert_eq!(completion.points_awarded, 20);
        assert_eq!(completion.group_id, ctx.group.id);
        assert!(completion.resolved_at.is_none());

        // Raising the task's value later does not change the snapshot
        let mut active_model: task::ActiveModel = task.into();
        active_model.points = Set(50);
        active_model.update(&ctx.db).await?;

        let stored = get_completion_by_id(&ctx.db, completion.id).await?.unwrap();
        assert_eq!(stored.points_awarded, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_completion_preconditions() -> Result<()> {
        let ctx = setup_with_group().await?;
        let task = create_test_task(&ctx, "Dishes", 20).await?;
        let outsider = create_test_user(&ctx.db, "outsider").await?;

        let result = submit_completion(&ctx.db, task.id, &outsider.id, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = submit_completion(&ctx.db, 999, &ctx.member.id, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Task", id: _ }
        ));

        deactivate_task(&ctx.db, task.id).await?;
        let result = submit_completion(&ctx.db, task.id, &ctx.member.id, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_completion_defaults_reason_and_keeps_balances() -> Result<()> {
        let ctx = setup_with_group().await?;
        let task = create_test_task(&ctx, "Dishes", 20).await?;
        let completion = submit_completion(&ctx.db, task.id, &ctx.member.id, None).await?;

        let rejected =
            reject_completion(&ctx.db, completion.id, &ctx.admin_actor(), None).await?;
        assert_eq!(rejected.status, CompletionStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some(DEFAULT_REJECTION_REASON)
        );
        assert_eq!(rejected.resolved_by.as_deref(), Some(ctx.admin.id.as_str()));
        assert!(rejected.resolved_at.is_some());

        let user = crate::core::user::require_user(&ctx.db, &ctx.member.id).await?;
        assert_eq!(user.current_points, 0);
        assert_eq!(user.total_earned, 0);
        let membership = get_membership(&ctx.db, ctx.group.id, &ctx.member.id)
            .await?
            .unwrap();
        assert_eq!(membership.points_earned, 0);
        assert!(get_pending_completions(&ctx.db, ctx.group.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_completion_is_terminal() -> Result<()> {
        let ctx = setup_with_group().await?;
        let task = create_test_task(&ctx, "Dishes", 20).await?;
        let completion = submit_completion(&ctx.db, task.id, &ctx.member.id, None).await?;

        reject_completion(
            &ctx.db,
            completion.id,
            &ctx.admin_actor(),
            Some("Not clean".to_string()),
        )
        .await?;

        let again = reject_completion(&ctx.db, completion.id, &ctx.admin_actor(), None).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::AlreadyProcessed {
                completion_id: _,
                status: CompletionStatus::Rejected
            }
        ));

        let stored = get_completion_by_id(&ctx.db, completion.id).await?.unwrap();
        assert_eq!(stored.rejection_reason.as_deref(), Some("Not clean"));

        let missing = reject_completion(&ctx.db, 999, &ctx.admin_actor(), None).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::NotFound {
                entity: "Task completion",
                id: _
            }
        ));

        Ok(())
    }
}
