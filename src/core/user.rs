//! User business logic - Registration and lookups.
//!
//! Point counters start at zero and are never written here; only the ledger
//! moves them.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Registers a user with zero balances.
///
/// Empty ids or display names are rejected; surrounding whitespace is trimmed.
pub async fn create_user(
    db: &DatabaseConnection,
    id: String,
    display_name: String,
    email: String,
) -> Result<user::Model> {
    if id.trim().is_empty() {
        return Err(Error::validation("User id cannot be empty"));
    }
    if display_name.trim().is_empty() {
        return Err(Error::validation("Display name cannot be empty"));
    }

    let user = user::ActiveModel {
        id: Set(id.trim().to_string()),
        display_name: Set(display_name.trim().to_string()),
        email: Set(email.trim().to_string()),
        current_points: Set(0),
        total_earned: Set(0),
        total_redeemed: Set(0),
        total_penalized: Set(0),
        created_at: Set(chrono::Utc::now()),
    };

    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id, returning None if not registered.
pub async fn get_user_by_id<C>(db: &C, user_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id, failing with `NotFound` if absent.
pub async fn require_user<C>(db: &C, user_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Checks the balance invariant
/// `current_points == total_earned - total_redeemed - total_penalized`.
#[must_use]
pub const fn is_balanced(user: &user::Model) -> bool {
    user.current_points == user.total_earned - user.total_redeemed - user.total_penalized
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_user(&db, "  ".to_string(), "Ana".to_string(), String::new()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_user(&db, "u1".to_string(), String::new(), String::new()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let user = create_user(
            &db,
            " u-ana ".to_string(),
            "Ana".to_string(),
            "ana@example.com".to_string(),
        )
        .await?;

        assert_eq!(user.id, "u-ana");
        assert_eq!(user.current_points, 0);
        assert_eq!(user.total_earned, 0);
        assert!(is_balanced(&user));

        let found = get_user_by_id(&db, "u-ana").await?.unwrap();
        assert_eq!(found, user);

        Ok(())
    }

    #[tokio::test]
    async fn test_require_user_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = require_user(&db, "ghost").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "User", id: _ }
        ));

        Ok(())
    }

    #[test]
    fn test_is_balanced_detects_drift() {
        let mut user = user::Model {
            id: "u1".to_string(),
            display_name: "U".to_string(),
            email: String::new(),
            current_points: 30,
            total_earned: 50,
            total_redeemed: 15,
            total_penalized: 5,
            created_at: chrono::Utc::now(),
        };
        assert!(is_balanced(&user));

        user.current_points = 35;
        assert!(!is_balanced(&user));
    }
}
