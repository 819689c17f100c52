//! Penalty business logic - Penalty types and the penalty audit trail.
//!
//! Applying a penalty moves points and therefore lives in the ledger; this
//! module manages the catalogue of penalty types and reads the audit rows.

use crate::{
    entities::{GroupPenalty, PenaltyType, group_penalty, penalty_type},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Defines a penalty type that deducts `points` each time it is applied.
pub async fn create_penalty_type(
    db: &DatabaseConnection,
    group_id: i64,
    name: String,
    points: i64,
    description: Option<String>,
) -> Result<penalty_type::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Penalty name cannot be empty"));
    }
    if points <= 0 {
        return Err(Error::InvalidAmount { amount: points });
    }

    crate::core::group::get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::not_found("Group", group_id))?;

    let penalty_type = penalty_type::ActiveModel {
        group_id: Set(group_id),
        name: Set(name.trim().to_string()),
        points: Set(points),
        description: Set(description),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    penalty_type.insert(db).await.map_err(Into::into)
}

/// Lists the active penalty types of a group, ordered alphabetically by name.
pub async fn get_active_penalty_types(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<penalty_type::Model>> {
    PenaltyType::find()
        .filter(penalty_type::Column::GroupId.eq(group_id))
        .filter(penalty_type::Column::IsActive.eq(true))
        .order_by_asc(penalty_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retires a penalty type; it can no longer be applied.
///
/// Penalties already applied keep referencing it.
pub async fn deactivate_penalty_type(
    db: &DatabaseConnection,
    penalty_type_id: i64,
) -> Result<penalty_type::Model> {
    let penalty_type = PenaltyType::find_by_id(penalty_type_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Penalty type", penalty_type_id))?;

    let mut active_model: penalty_type::ActiveModel = penalty_type.into();
    active_model.is_active = Set(false);
    active_model.update(db).await.map_err(Into::into)
}

/// Lists the penalties applied to a member of a group, newest first.
pub async fn get_penalties_for_member(
    db: &DatabaseConnection,
    group_id: i64,
    member_id: &str,
) -> Result<Vec<group_penalty::Model>> {
    GroupPenalty::find()
        .filter(group_penalty::Column::GroupId.eq(group_id))
        .filter(group_penalty::Column::MemberId.eq(member_id))
        .order_by_desc(group_penalty::Column::CreatedAt)
        .order_by_desc(group_penalty::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_penalty_type_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_penalty_type(&db, 1, String::new(), 5, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_penalty_type(&db, 1, "Late".to_string(), 0, None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 0 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_penalty_type_unknown_group() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_penalty_type(&db, 42, "Late".to_string(), 5, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Group", id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_penalty_types_are_hidden() -> Result<()> {
        let ctx = setup_with_group().await?;
        let late = create_test_penalty_type(&ctx, "Late", 5).await?;
        create_test_penalty_type(&ctx, "Chores skipped", 10).await?;

        let retired = deactivate_penalty_type(&ctx.db, late.id).await?;
        assert!(!retired.is_active);

        let active = get_active_penalty_types(&ctx.db, ctx.group.id).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Chores skipped");

        let missing = deactivate_penalty_type(&ctx.db, 404).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_no_penalties_for_new_member() -> Result<()> {
        let ctx = setup_with_group().await?;

        let penalties = get_penalties_for_member(&ctx.db, ctx.group.id, &ctx.member.id).await?;
        assert!(penalties.is_empty());

        Ok(())
    }
}
