//! Seed data loading from config.toml
//!
//! The bootstrap binary reads users, groups and each group's tasks, penalty
//! types and rewards from a TOML file and inserts whatever is missing.

use crate::{
    core::{group, penalty, reward, task, user},
    entities::MemberRole,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the seed file.
pub const CONFIG_PATH_VAR: &str = "HAPPY_POINTS_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Users to register
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Groups to create, with their catalogues
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

/// A user to register
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Identity-provider id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Contact email
    pub email: String,
}

/// A group and everything it offers
#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    /// Group name, used to detect an already seeded group
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// User id of the creating admin
    pub admin: String,
    /// Additional plain members
    #[serde(default)]
    pub members: Vec<String>,
    /// Tasks members can complete
    #[serde(default)]
    pub tasks: Vec<CatalogueItem>,
    /// Penalties admins can apply
    #[serde(default)]
    pub penalty_types: Vec<CatalogueItem>,
    /// Rewards members can redeem
    #[serde(default)]
    pub rewards: Vec<CatalogueItem>,
}

/// A named item with a point value (task, penalty type or reward)
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogueItem {
    /// Title or name
    pub name: String,
    /// Points earned, deducted, or spent
    pub points: i64,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read (`Error::Io`)
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_config(&contents)
}

/// Parses seed configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Path of the seed file: `$HAPPY_POINTS_CONFIG`, or `config.toml`.
#[must_use]
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string())
}

/// What [`seed_database`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Users inserted by this run
    pub users_created: usize,
    /// Ids of groups inserted by this run
    pub groups_created: Vec<i64>,
    /// Ids of configured groups that already existed
    pub groups_existing: Vec<i64>,
}

/// Inserts the configured users and groups that are not in the database yet.
///
/// Users are matched by id and groups by name. An existing group is left
/// exactly as it is, including its catalogue.
pub async fn seed_database(db: &DatabaseConnection, config: &Config) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for user_config in &config.users {
        if user::get_user_by_id(db, &user_config.id).await?.is_some() {
            debug!(user_id = %user_config.id, "User already seeded");
            continue;
        }
        user::create_user(
            db,
            user_config.id.clone(),
            user_config.display_name.clone(),
            user_config.email.clone(),
        )
        .await?;
        summary.users_created += 1;
    }

    for group_config in &config.groups {
        if let Some(existing) = group::get_group_by_name(db, &group_config.name).await? {
            debug!(group_id = existing.id, "Group already seeded");
            summary.groups_existing.push(existing.id);
            continue;
        }

        let created = group::create_group(
            db,
            group_config.name.clone(),
            group_config.description.clone(),
            &group_config.admin,
        )
        .await?;

        for member in &group_config.members {
            group::add_member(db, created.id, member, MemberRole::Member).await?;
        }
        for item in &group_config.tasks {
            task::create_task(
                db,
                created.id,
                item.name.clone(),
                item.description.clone(),
                item.points,
                &group_config.admin,
            )
            .await?;
        }
        for item in &group_config.penalty_types {
            penalty::create_penalty_type(
                db,
                created.id,
                item.name.clone(),
                item.points,
                item.description.clone(),
            )
            .await?;
        }
        for item in &group_config.rewards {
            reward::create_reward(
                db,
                created.id,
                item.name.clone(),
                item.points,
                item.description.clone(),
            )
            .await?;
        }

        summary.groups_created.push(created.id);
    }

    info!(
        users_created = summary.users_created,
        groups_created = summary.groups_created.len(),
        groups_existing = summary.groups_existing.len(),
        "Seeding finished"
    );
    Ok(summary)
}
