//! Transaction history - Read access to the append-only point log.
//!
//! Records are written exclusively by [`crate::core::ledger`]; this module
//! only queries them. Lists are newest first, with the record id breaking ties
//! between records written within the same timestamp.

use crate::{
    entities::{Transaction, transaction},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};

/// Retrieves a user's transactions, newest first, optionally capped at `limit`.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: &str,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    let mut query = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

/// Retrieves every transaction booked in a group, newest first.
pub async fn get_transactions_for_group(
    db: &DatabaseConnection,
    group_id: i64,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    let mut query = Transaction::find()
        .filter(transaction::Column::GroupId.eq(group_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::{Actor, AwardReason, award_direct};
    use crate::entities::TransactionType;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_transaction_by_id_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<transaction::Model>::new()])
            .into_connection();

        let transaction = get_transaction_by_id(&db, 999).await?;
        assert!(transaction.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() -> Result<()> {
        let ctx = setup_with_group().await?;
        let admin = Actor::new(&ctx.admin.id, "Admin");

        for points in [10, 20, 30] {
            award_direct(&ctx.db, ctx.group.id, &ctx.member.id, &admin, points, AwardReason::AdHoc)
                .await?;
        }

        let all = get_transactions_for_user(&ctx.db, &ctx.member.id, None).await?;
        let amounts: Vec<i64> = all.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![30, 20, 10]);
        assert!(all.iter().all(|t| t.transaction_type == TransactionType::Earn));

        let latest = get_transactions_for_user(&ctx.db, &ctx.member.id, Some(2)).await?;
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0], all[0]);

        let found = get_transaction_by_id(&ctx.db, all[2].id).await?.unwrap();
        assert_eq!(found, all[2]);

        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_scoped() -> Result<()> {
        let ctx = setup_with_group().await?;
        let admin = ctx.admin_actor();
        award_direct(&ctx.db, ctx.group.id, &ctx.member.id, &admin, 10, AwardReason::AdHoc).await?;
        award_direct(&ctx.db, ctx.group.id, &ctx.admin.id, &admin, 5, AwardReason::AdHoc).await?;

        let member_history = get_transactions_for_user(&ctx.db, &ctx.member.id, None).await?;
        assert_eq!(member_history.len(), 1);
        assert_eq!(member_history[0].user_id, ctx.member.id);

        let group_history = get_transactions_for_group(&ctx.db, ctx.group.id, None).await?;
        assert_eq!(group_history.len(), 2);
        assert!(
            get_transactions_for_group(&ctx.db, ctx.group.id + 1, None)
                .await?
                .is_empty()
        );

        Ok(())
    }
}
