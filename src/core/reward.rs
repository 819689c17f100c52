//! Reward business logic - The prizes a group offers.
//!
//! Redemption itself is a ledger operation; see
//! [`crate::core::ledger::redeem_reward`].

use crate::{
    entities::{Reward, reward},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Adds a reward costing `cost` points to a group.
pub async fn create_reward(
    db: &DatabaseConnection,
    group_id: i64,
    name: String,
    cost: i64,
    description: Option<String>,
) -> Result<reward::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Reward name cannot be empty"));
    }
    if cost <= 0 {
        return Err(Error::InvalidAmount { amount: cost });
    }

    crate::core::group::get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::not_found("Group", group_id))?;

    let reward = reward::ActiveModel {
        group_id: Set(group_id),
        name: Set(name.trim().to_string()),
        description: Set(description),
        cost: Set(cost),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    reward.insert(db).await.map_err(Into::into)
}

/// Lists a group's active rewards, cheapest first.
pub async fn get_active_rewards(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<reward::Model>> {
    Reward::find()
        .filter(reward::Column::GroupId.eq(group_id))
        .filter(reward::Column::IsActive.eq(true))
        .order_by_asc(reward::Column::Cost)
        .order_by_asc(reward::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Withdraws a reward from redemption.
pub async fn deactivate_reward(db: &DatabaseConnection, reward_id: i64) -> Result<reward::Model> {
    let reward = Reward::find_by_id(reward_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Reward", reward_id))?;

    let mut active_model: reward::ActiveModel = reward.into();
    active_model.is_active = Set(false);
    active_model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::{self, AwardReason};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_active_rewards_sorted_by_cost() -> Result<()> {
        let ctx = setup_with_group().await?;
        create_test_reward(&ctx, "Movie night", 100).await?;
        create_test_reward(&ctx, "Ice cream", 20).await?;

        let rewards = get_active_rewards(&ctx.db, ctx.group.id).await?;
        let names: Vec<&str> = rewards.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ice cream", "Movie night"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_reward_validation() -> Result<()> {
        let ctx = setup_with_group().await?;

        let result = create_reward(&ctx.db, ctx.group.id, "Cake".to_string(), -1, None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: -1 }));

        let result = create_reward(&ctx.db, ctx.group.id, " ".to_string(), 10, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_reward_cannot_be_redeemed() -> Result<()> {
        let ctx = setup_with_group().await?;
        let cake = create_test_reward(&ctx, "Cake", 10).await?;
        ledger::award_direct(
            &ctx.db,
            ctx.group.id,
            &ctx.member.id,
            &ctx.admin_actor(),
            50,
            AwardReason::AdHoc,
        )
        .await?;

        deactivate_reward(&ctx.db, cake.id).await?;
        assert!(get_active_rewards(&ctx.db, ctx.group.id).await?.is_empty());

        let result = ledger::redeem_reward(&ctx.db, ctx.group.id, &ctx.member.id, cake.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Reward", id: _ }
        ));

        Ok(())
    }
}
