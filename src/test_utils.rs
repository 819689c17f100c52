//! Shared test utilities for Happy Points.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{group, ledger::Actor, penalty, reward, task, user},
    entities::{self, MemberRole},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with sensible defaults.
///
/// # Defaults
/// * `display_name`: `"User <id>"`
/// * `email`: `"<id>@example.com"`
pub async fn create_test_user(db: &DatabaseConnection, id: &str) -> Result<entities::user::Model> {
    user::create_user(
        db,
        id.to_string(),
        format!("User {id}"),
        format!("{id}@example.com"),
    )
    .await
}

/// A database holding one group with an admin and a plain member.
pub struct TestGroup {
    /// In-memory database
    pub db: DatabaseConnection,
    /// The group's creator (`"admin"`)
    pub admin: entities::user::Model,
    /// A plain member (`"member"`)
    pub member: entities::user::Model,
    /// The group (`"Test Group"`)
    pub group: entities::group::Model,
}

impl TestGroup {
    /// The admin as an actor named `"Admin"`.
    pub fn admin_actor(&self) -> Actor<'_> {
        Actor::new(&self.admin.id, "Admin")
    }
}

/// Sets up a complete test environment with a group, its admin and a member.
pub async fn setup_with_group() -> Result<TestGroup> {
    let db = setup_test_db().await?;
    let admin = create_test_user(&db, "admin").await?;
    let member = create_test_user(&db, "member").await?;
    let group = group::create_group(&db, "Test Group".to_string(), None, &admin.id).await?;
    group::add_member(&db, group.id, &member.id, MemberRole::Member).await?;

    Ok(TestGroup {
        db,
        admin,
        member,
        group,
    })
}

/// Creates an active task in the test group.
pub async fn create_test_task(
    ctx: &TestGroup,
    title: &str,
    points: i64,
) -> Result<entities::task::Model> {
    task::create_task(
        &ctx.db,
        ctx.group.id,
        title.to_string(),
        None,
        points,
        &ctx.admin.id,
    )
    .await
}

/// Creates an active penalty type in the test group.
pub async fn create_test_penalty_type(
    ctx: &TestGroup,
    name: &str,
    points: i64,
) -> Result<entities::penalty_type::Model> {
    penalty::create_penalty_type(&ctx.db, ctx.group.id, name.to_string(), points, None).await
}

/// Creates an active reward in the test group.
pub async fn create_test_reward(
    ctx: &TestGroup,
    name: &str,
    cost: i64,
) -> Result<entities::reward::Model> {
    reward::create_reward(&ctx.db, ctx.group.id, name.to_string(), cost, None).await
}
