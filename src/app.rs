//! Application service - the single owner of shared state.
//!
//! `HappyPoints` bundles the database connection with the balance cache and
//! forwards ledger operations, evicting the affected user from the cache after
//! every successful commit. Front ends hold one of these instead of keeping
//! their own copies of user balances.

use crate::{
    cache::BalanceCache,
    core::{
        ledger::{
            self, Actor, AppliedPenalty, AwardReason, DirectAward, LedgerReceipt, TaskApproval,
        },
        task,
    },
    entities::{task_completion, user},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handle to the ledger and its read cache. Clones share both.
#[derive(Debug, Clone)]
pub struct HappyPoints {
    database: Arc<DatabaseConnection>,
    cache: Arc<BalanceCache>,
}

impl HappyPoints {
    /// Creates a service with an empty cache.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database: Arc::new(database),
            cache: Arc::new(BalanceCache::new()),
        }
    }

    /// Database connection for operations outside the ledger.
    #[must_use]
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// The balance cache shared by all clones of this handle.
    #[must_use]
    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    /// Reads a user's balances, from the cache when possible.
    pub async fn user(&self, user_id: &str) -> Result<user::Model> {
        self.cache.get_or_load(&self.database, user_id).await
    }

    /// See [`ledger::award_for_task_completion`].
    pub async fn approve_completion(
        &self,
        completion_id: i64,
        approver: &Actor<'_>,
    ) -> Result<TaskApproval> {
        let approval =
            ledger::award_for_task_completion(&self.database, completion_id, approver).await?;
        self.cache.invalidate(&approval.completion.user_id).await;
        Ok(approval)
    }

    /// See [`task::reject_completion`]. Balances do not change, so nothing is evicted.
    pub async fn reject_completion(
        &self,
        completion_id: i64,
        approver: &Actor<'_>,
        reason: Option<String>,
    ) -> Result<task_completion::Model> {
        task::reject_completion(&self.database, completion_id, approver, reason).await
    }

    /// See [`ledger::award_direct`].
    pub async fn award_direct(
        &self,
        group_id: i64,
        member_id: &str,
        admin: &Actor<'_>,
        points: i64,
        reason: AwardReason,
    ) -> Result<DirectAward> {
        let award =
            ledger::award_direct(&self.database, group_id, member_id, admin, points, reason)
                .await?;
        self.cache.invalidate(member_id).await;
        Ok(award)
    }

    /// See [`ledger::apply_penalty`].
    pub async fn apply_penalty(
        &self,
        group_id: i64,
        member_id: &str,
        penalty_type_id: i64,
        admin: &Actor<'_>,
        reason: Option<String>,
    ) -> Result<AppliedPenalty> {
        let applied = ledger::apply_penalty(
            &self.database,
            group_id,
            member_id,
            penalty_type_id,
            admin,
            reason,
        )
        .await?;
        self.cache.invalidate(member_id).await;
        Ok(applied)
    }

    /// See [`ledger::redeem_reward`].
    pub async fn redeem_reward(
        &self,
        group_id: i64,
        member_id: &str,
        reward_id: i64,
    ) -> Result<LedgerReceipt> {
        let receipt =
            ledger::redeem_reward(&self.database, group_id, member_id, reward_id).await?;
        self.cache.invalidate(member_id).await;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::submit_completion;
    use crate::errors::Error;
    use crate::test_utils::*;
    use crate::entities::group;

    struct TestApp {
        app: HappyPoints,
        admin_id: String,
        member_id: String,
        group: group::Model,
    }

    impl TestApp {
        fn admin(&self) -> Actor<'_> {
            Actor::new(&self.admin_id, "Admin")
        }
    }

    async fn setup_app() -> Result<TestApp> {
        let TestGroup {
            db,
            admin,
            member,
            group,
        } = setup_with_group().await?;
        Ok(TestApp {
            app: HappyPoints::new(db),
            admin_id: admin.id,
            member_id: member.id,
            group,
        })
    }

    async fn create_task(ctx: &TestApp, title: &str, points: i64) -> Result<i64> {
        let task = crate::core::task::create_task(
            ctx.app.database(),
            ctx.group.id,
            title.to_string(),
            None,
            points,
            &ctx.admin_id,
        )
        .await?;
        Ok(task.id)
    }

    #[tokio::test]
    async fn test_ledger_success_refreshes_cached_balance() -> Result<()> {
        let ctx = setup_app().await?;
        let app = &ctx.app;

        assert_eq!(app.user(&ctx.member_id).await?.current_points, 0);

        app.award_direct(
            ctx.group.id,
            &ctx.member_id,
            &ctx.admin(),
            50,
            AwardReason::AdHoc,
        )
        .await?;
        assert_eq!(app.user(&ctx.member_id).await?.current_points, 50);

        let task_id = create_task(&ctx, "Dishes", 20).await?;
        let completion = submit_completion(app.database(), task_id, &ctx.member_id, None).await?;
        app.approve_completion(completion.id, &ctx.admin()).await?;
        assert_eq!(app.user(&ctx.member_id).await?.total_earned, 70);

        let snack = crate::core::reward::create_reward(
            app.database(),
            ctx.group.id,
            "Snack".to_string(),
            30,
            None,
        )
        .await?;
        app.redeem_reward(ctx.group.id, &ctx.member_id, snack.id)
            .await?;
        let late = crate::core::penalty::create_penalty_type(
            app.database(),
            ctx.group.id,
            "Late".to_string(),
            5,
            None,
        )
        .await?;
        app.apply_penalty(ctx.group.id, &ctx.member_id, late.id, &ctx.admin(), None)
            .await?;

        let user = app.user(&ctx.member_id).await?;
        assert_eq!(user.current_points, 35);
        assert!(crate::core::user::is_balanced(&user));

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_operation_keeps_cache_entry() -> Result<()> {
        let ctx = setup_app().await?;
        let app = &ctx.app;
        app.user(&ctx.member_id).await?;

        let result = app
            .award_direct(
                ctx.group.id,
                &ctx.member_id,
                &ctx.admin(),
                0,
                AwardReason::AdHoc,
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 0 })));
        assert_eq!(app.cache().len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_the_cache() -> Result<()> {
        let ctx = setup_app().await?;
        let app = &ctx.app;
        let other = app.clone();

        app.user(&ctx.member_id).await?;
        assert_eq!(other.cache().len().await, 1);

        other
            .award_direct(
                ctx.group.id,
                &ctx.member_id,
                &ctx.admin(),
                10,
                AwardReason::AdHoc,
            )
            .await?;
        assert!(app.cache().is_empty().await);
        assert_eq!(app.user(&ctx.member_id).await?.current_points, 10);

        let task_id = create_task(&ctx, "Dishes", 20).await?;
        let completion =
            submit_completion(other.database(), task_id, &ctx.member_id, None).await?;
        let rejected = app
            .reject_completion(completion.id, &ctx.admin(), None)
            .await?;
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some(task::DEFAULT_REJECTION_REASON)
        );

        Ok(())
    }
}
