//! In-process read cache of user balances.
//!
//! Users are cached by id on first read. A successful ledger operation evicts
//! the affected user, so the next read goes back to the database; the cache is
//! never written from a ledger receipt.

use crate::{core::user::require_user, entities::user, errors::Result};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Entries {
    users: HashMap<String, user::Model>,
    // Bumped by every invalidation; a load only fills the entry if its
    // generation is unchanged since the miss.
    generations: HashMap<String, u64>,
}

impl Entries {
    fn generation(&self, user_id: &str) -> u64 {
        self.generations.get(user_id).copied().unwrap_or_default()
    }
}

enum Lookup {
    Hit(user::Model),
    Miss { generation: u64 },
}

/// Read-through cache of `users` rows keyed by user id.
#[derive(Debug, Default)]
pub struct BalanceCache {
    entries: RwLock<Entries>,
}

impl BalanceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached user, loading it from `db` on a miss.
    ///
    /// A row loaded while an invalidation for the same user lands is returned
    /// but not cached.
    pub async fn get_or_load(&self, db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
        let generation = match self.lookup(user_id).await {
            Lookup::Hit(user) => {
                trace!(user_id, "Balance cache hit");
                return Ok(user);
            }
            Lookup::Miss { generation } => generation,
        };

        let user = require_user(db, user_id).await?;
        debug!(user_id, "Balance cache miss, loaded from database");
        self.store(user.clone(), generation).await;
        Ok(user)
    }

    /// Drops the cached entry for `user_id`, if any, and discards loads still
    /// in flight for it.
    pub async fn invalidate(&self, user_id: &str) {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(user_id.to_string()).or_default() += 1;
        if entries.users.remove(user_id).is_some() {
            debug!(user_id, "Invalidated cached balance");
        }
    }

    /// Number of cached users.
    pub async fn len(&self) -> usize {
        self.entries.read().await.users.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.users.is_empty()
    }

    async fn lookup(&self, user_id: &str) -> Lookup {
        let entries = self.entries.read().await;
        match entries.users.get(user_id) {
            Some(user) => Lookup::Hit(user.clone()),
            None => Lookup::Miss {
                generation: entries.generation(user_id),
            },
        }
    }

    async fn store(&self, user: user::Model, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if entries.generation(&user.id) != generation {
            debug!(user_id = %user.id, "Balance invalidated during load, not caching");
            return false;
        }
        entries.users.insert(user.id.clone(), user);
        true
    }
}
