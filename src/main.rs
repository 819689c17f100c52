use happy_points::{
    config::{
        database::{create_connection, create_tables},
        seed::{config_path, load_config, seed_database},
    },
    core::group::leaderboard,
    errors::Result,
};
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed from config.toml, if there is one
    let path = config_path();
    if !Path::new(&path).exists() {
        warn!("No seed file at {}, skipping seeding", path);
        return Ok(());
    }

    let config = load_config(&path)?;
    let summary = seed_database(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;

    // 5. Show where every configured group stands
    for group_id in summary
        .groups_created
        .iter()
        .chain(&summary.groups_existing)
    {
        for (rank, entry) in leaderboard(&db, *group_id).await?.iter().enumerate() {
            info!(
                group_id,
                "#{} {} ({}) - {} pts",
                rank + 1,
                entry.display_name,
                entry.role,
                entry.net_points
            );
        }
    }

    Ok(())
}
