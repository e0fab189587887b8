//! The ledger: users, reports, and day-bucketed totals.
//!
//! Users are cached in memory as a read-through view over the store; the
//! store stays the only source of truth. Reads that fail are logged and
//! degrade to absence (no user, no reports, zero kcal). Writes report a
//! [`LedgerError::Persistence`].

use crate::error::{LedgerError, LedgerResult};
use crate::store::Store;
use dashmap::DashMap;
use foodbot_common::{DayBucket, Product, Report, User, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `floor(sum(kcal * grams) / 100)` over all reports, truncated once after summing.
///
/// The sum saturates at `u64::MAX`.
pub fn total_kcal(reports: &[Report]) -> u64 {
    let weighted = reports.iter().fold(0u64, |acc, report| {
        acc.saturating_add(u64::from(report.kcal_per_100g) * u64::from(report.grams))
    });
    weighted / 100
}

/// Authoritative access to users and intake history.
pub struct Ledger {
    store: Arc<dyn Store>,
    users: DashMap<String, User>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("cached_users", &self.users.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Opens the ledger and warms the user cache.
    ///
    /// Failing to load users is fatal: there is no partial-start mode.
    pub async fn open(store: Arc<dyn Store>) -> LedgerResult<Self> {
        let users = store.load_users().await.map_err(LedgerError::Startup)?;
        info!("Ledger opened with {} users", users.len());

        let cache = DashMap::with_capacity(users.len());
        for user in users {
            cache.insert(user.name.clone(), user);
        }

        Ok(Self {
            store,
            users: cache,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Looks a user up by chat name.
    pub async fn find_user(&self, name: &str) -> LedgerResult<User> {
        if let Some(user) = self.users.get(name) {
            return Ok(user.clone());
        }

        match self.store.find_user_by_name(name).await {
            Ok(Some(user)) => {
                self.users.insert(user.name.clone(), user.clone());
                Ok(user)
            }
            Ok(None) => Err(LedgerError::UserNotFound(name.to_string())),
            Err(e) => {
                warn!(user = name, "User lookup failed, treating as unknown: {}", e);
                Err(LedgerError::UserNotFound(name.to_string()))
            }
        }
    }

    /// Registers a user, or returns the existing one with that name.
    pub async fn register_user(&self, name: &str, timezone_offset_seconds: i32) -> LedgerResult<User> {
        let user = self
            .store
            .create_user(name, timezone_offset_seconds)
            .await
            .map_err(|e| LedgerError::persistence("register user", e))?;

        info!(user = name, id = %user.id, "Registered user");
        self.users.insert(user.name.clone(), user.clone());
        Ok(user)
    }

    /// Persists a new daily limit and returns the updated user.
    pub async fn set_daily_limit(&self, user: &User, daily_limit_kcal: u32) -> LedgerResult<User> {
        self.store
            .save_daily_limit(user.id, daily_limit_kcal)
            .await
            .map_err(|e| LedgerError::persistence("save daily limit", e))?;

        let updated = User {
            daily_limit_kcal,
            ..user.clone()
        };
        self.users.insert(updated.name.clone(), updated.clone());
        debug!(user = %user.name, daily_limit_kcal, "Daily limit updated");
        Ok(updated)
    }

    /// Appends a report. Business rules are the caller's concern.
    pub async fn append_report(&self, user_id: UserId, report: &Report) -> LedgerResult<()> {
        self.store
            .save_report(user_id, report)
            .await
            .map_err(|e| LedgerError::persistence("save report", e))
    }

    /// Persists a product pair.
    pub async fn save_product(&self, product: &Product) -> LedgerResult<()> {
        self.store
            .save_product(product)
            .await
            .map_err(|e| LedgerError::persistence("save product", e))
    }

    /// Day totals for every requested bucket; buckets without reports map to 0.
    pub async fn history_for_buckets(
        &self,
        user: &User,
        buckets: &[DayBucket],
    ) -> BTreeMap<DayBucket, u64> {
        let mut history: BTreeMap<DayBucket, u64> =
            buckets.iter().map(|bucket| (*bucket, 0)).collect();

        match self
            .store
            .history_for_buckets(user.id, user.timezone_offset_seconds, buckets)
            .await
        {
            Ok(found) => {
                for (bucket, kcal) in found {
                    if let Some(slot) = history.get_mut(&bucket) {
                        *slot = kcal;
                    }
                }
            }
            Err(e) => warn!(user = %user.name, "History query failed, reporting zeros: {}", e),
        }

        history
    }

    /// Reports inside one local day, ascending by timestamp.
    pub async fn reports_for_bucket(&self, user: &User, bucket: DayBucket) -> Vec<Report> {
        self.store
            .reports_for_bucket(user.id, user.timezone_offset_seconds, bucket)
            .await
            .unwrap_or_else(|e| {
                warn!(user = %user.name, bucket, "Report query failed, reporting none: {}", e);
                Vec::new()
            })
    }

    /// Up to `limit` recently reported products, newest first.
    pub async fn recent_products(&self, limit: usize) -> Vec<Product> {
        self.store.recent_products(limit).await.unwrap_or_else(|e| {
            warn!("Recent products query failed: {}", e);
            Vec::new()
        })
    }

    /// Every persisted product.
    pub async fn load_products(&self) -> Vec<Product> {
        self.store.load_products().await.unwrap_or_else(|e| {
            warn!("Product query failed: {}", e);
            Vec::new()
        })
    }
}
