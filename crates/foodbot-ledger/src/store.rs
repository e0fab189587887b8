//! The narrow query interface the ledger consumes.

use crate::error::StoreResult;
use async_trait::async_trait;
use foodbot_common::{DayBucket, Product, Report, User, UserId};
use std::collections::BTreeMap;

/// Persistent storage for users, products, and reports.
///
/// Every write is atomic per call. Bucketed queries take the user's UTC
/// offset so implementations can derive day boundaries from stored UTC
/// timestamps.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// All registered users.
    async fn load_users(&self) -> StoreResult<Vec<User>>;

    /// All distinct (name, kcal) products.
    async fn load_products(&self) -> StoreResult<Vec<Product>>;

    /// The user registered under `name`, if any.
    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    /// Registers `name`, or returns the existing user with that name.
    async fn create_user(&self, name: &str, timezone_offset_seconds: i32) -> StoreResult<User>;

    /// Replaces a user's daily limit.
    async fn save_daily_limit(&self, user_id: UserId, daily_limit_kcal: u32) -> StoreResult<()>;

    /// Records a product; saving a known (name, kcal) pair is a no-op.
    async fn save_product(&self, product: &Product) -> StoreResult<()>;

    /// Appends a report for the user.
    async fn save_report(&self, user_id: UserId, report: &Report) -> StoreResult<()>;

    /// `floor(sum(kcal * grams) / 100)` per requested bucket, in one round trip.
    ///
    /// Buckets without reports may be absent from the result.
    async fn history_for_buckets(
        &self,
        user_id: UserId,
        timezone_offset_seconds: i32,
        buckets: &[DayBucket],
    ) -> StoreResult<BTreeMap<DayBucket, u64>>;

    /// Reports inside one bucket, ascending by timestamp.
    async fn reports_for_bucket(
        &self,
        user_id: UserId,
        timezone_offset_seconds: i32,
        bucket: DayBucket,
    ) -> StoreResult<Vec<Report>>;

    /// Up to `limit` products, most recently reported first, without duplicates.
    async fn recent_products(&self, limit: usize) -> StoreResult<Vec<Product>>;
}
