//! SQLite-backed [`Store`] built on sqlx.
//!
//! Timestamps are stored as Unix seconds in UTC. Day buckets are never
//! persisted; they are derived per query from the caller's offset.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use foodbot_common::{bucket_bounds, DayBucket, Product, Report, User, UserId, SECONDS_PER_DAY};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info};

/// Database schema version
const SCHEMA_VERSION: i32 = 1;

/// Path understood as a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Persistent storage for users, products, and reports
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// SQLite connection pool
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `path` and initializes its schema.
    ///
    /// `:memory:` opens a private in-memory database on a single connection
    /// that lives as long as the store.
    pub async fn connect(path: &str, max_connections: u32) -> StoreResult<Self> {
        info!("Opening SQLite store at {}", path);

        let pool = if path == IN_MEMORY_PATH {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true);
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.initialize_schema().await?;

        info!("SQLite store ready");
        Ok(store)
    }

    /// Opens a private in-memory store.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect(IN_MEMORY_PATH, 1).await
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Initialize the database schema
    async fn initialize_schema(&self) -> StoreResult<()> {
        debug!("Initializing database schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                daily_limit_kcal INTEGER NOT NULL DEFAULT 0,
                timezone_offset_seconds INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                name TEXT NOT NULL,
                kcal INTEGER NOT NULL,
                UNIQUE (name, kcal)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                timestamp_utc INTEGER NOT NULL,
                product TEXT NOT NULL,
                kcal INTEGER NOT NULL,
                grams INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reports_user_time ON reports(user_id, timestamp_utc)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR REPLACE INTO schema_version (version) VALUES (?)")
            .bind(SCHEMA_VERSION)
            .execute(&self.pool)
            .await?;

        debug!("Database schema initialized (version {})", SCHEMA_VERSION);
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    let daily_limit: i64 = row.try_get("daily_limit_kcal")?;
    let offset: i64 = row.try_get("timezone_offset_seconds")?;

    Ok(User {
        id: UserId(row.try_get("id")?),
        name: row.try_get("name")?,
        daily_limit_kcal: u32::try_from(daily_limit)
            .map_err(|_| StoreError::invalid_row("users", format!("daily limit {daily_limit}")))?,
        timezone_offset_seconds: i32::try_from(offset)
            .map_err(|_| StoreError::invalid_row("users", format!("offset {offset}")))?,
    })
}

fn product_from_row(row: &SqliteRow, table: &'static str) -> StoreResult<Product> {
    let kcal: i64 = row.try_get(1)?;
    Ok(Product {
        name: row.try_get(0)?,
        kcal_per_100g: u32::try_from(kcal)
            .map_err(|_| StoreError::invalid_row(table, format!("kcal {kcal}")))?,
    })
}

fn report_from_row(row: &SqliteRow) -> StoreResult<Report> {
    let seconds: i64 = row.try_get("timestamp_utc")?;
    let kcal: i64 = row.try_get("kcal")?;
    let grams: i64 = row.try_get("grams")?;

    Ok(Report {
        timestamp: Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| StoreError::invalid_row("reports", format!("timestamp {seconds}")))?,
        product_name: row.try_get("product")?,
        kcal_per_100g: u32::try_from(kcal)
            .map_err(|_| StoreError::invalid_row("reports", format!("kcal {kcal}")))?,
        grams: u32::try_from(grams)
            .map_err(|_| StoreError::invalid_row("reports", format!("grams {grams}")))?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn load_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, daily_limit_kcal, timezone_offset_seconds FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn load_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT name, kcal FROM products ORDER BY name, kcal")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| product_from_row(row, "products"))
            .collect()
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, daily_limit_kcal, timezone_offset_seconds FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(&self, name: &str, timezone_offset_seconds: i32) -> StoreResult<User> {
        sqlx::query(
            "INSERT OR IGNORE INTO users (name, daily_limit_kcal, timezone_offset_seconds) VALUES (?, 0, ?)",
        )
        .bind(name)
        .bind(timezone_offset_seconds)
        .execute(&self.pool)
        .await?;

        self.find_user_by_name(name)
            .await?
            .ok_or_else(|| StoreError::invalid_row("users", format!("{name} missing after insert")))
    }

    async fn save_daily_limit(&self, user_id: UserId, daily_limit_kcal: u32) -> StoreResult<()> {
        sqlx::query("UPDATE users SET daily_limit_kcal = ? WHERE id = ?")
            .bind(i64::from(daily_limit_kcal))
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_product(&self, product: &Product) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO products (name, kcal) VALUES (?, ?)")
            .bind(&product.name)
            .bind(i64::from(product.kcal_per_100g))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_report(&self, user_id: UserId, report: &Report) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (user_id, timestamp_utc, product, kcal, grams)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.0)
        .bind(report.timestamp.timestamp())
        .bind(&report.product_name)
        .bind(i64::from(report.kcal_per_100g))
        .bind(i64::from(report.grams))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn history_for_buckets(
        &self,
        user_id: UserId,
        timezone_offset_seconds: i32,
        buckets: &[DayBucket],
    ) -> StoreResult<BTreeMap<DayBucket, u64>> {
        let (Some(first), Some(last)) = (buckets.iter().min(), buckets.iter().max()) else {
            return Ok(BTreeMap::new());
        };
        let (range_start, _) = bucket_bounds(*first, timezone_offset_seconds);
        let (_, range_end) = bucket_bounds(*last, timezone_offset_seconds);

        // SQLite division truncates toward zero; shift the remainder to floor.
        let mut query = format!(
            "SELECT (local - ((local % {day}) + {day}) % {day}) / {day} AS bucket, \
             SUM(kcal * grams) AS weighted \
             FROM (SELECT timestamp_utc + ? AS local, kcal, grams FROM reports \
                   WHERE user_id = ? AND timestamp_utc >= ? AND timestamp_utc < ?) \
             GROUP BY bucket HAVING bucket IN (?",
            day = SECONDS_PER_DAY
        );
        for _ in 1..buckets.len() {
            query.push_str(", ?");
        }
        query.push(')');

        let mut query_builder = sqlx::query(&query)
            .bind(timezone_offset_seconds)
            .bind(user_id.0)
            .bind(range_start)
            .bind(range_end);
        for bucket in buckets {
            query_builder = query_builder.bind(*bucket);
        }

        let rows = query_builder.fetch_all(&self.pool).await?;

        let mut history = BTreeMap::new();
        for row in rows {
            let bucket: i64 = row.try_get("bucket")?;
            let weighted: i64 = row.try_get("weighted")?;
            let weighted = u64::try_from(weighted)
                .map_err(|_| StoreError::invalid_row("reports", format!("sum {weighted}")))?;
            history.insert(bucket, weighted / 100);
        }

        debug!(
            user_id = %user_id,
            requested = buckets.len(),
            found = history.len(),
            "Loaded bucket history"
        );
        Ok(history)
    }

    async fn reports_for_bucket(
        &self,
        user_id: UserId,
        timezone_offset_seconds: i32,
        bucket: DayBucket,
    ) -> StoreResult<Vec<Report>> {
        let (start, end) = bucket_bounds(bucket, timezone_offset_seconds);

        let rows = sqlx::query(
            r#"
            SELECT timestamp_utc, product, kcal, grams FROM reports
            WHERE user_id = ? AND timestamp_utc >= ? AND timestamp_utc < ?
            ORDER BY timestamp_utc, id
            "#,
        )
        .bind(user_id.0)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }

    async fn recent_products(&self, limit: usize) -> StoreResult<Vec<Product>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT product, kcal, MAX(id) AS latest FROM reports
            GROUP BY product, kcal
            ORDER BY latest DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| product_from_row(row, "reports"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbot_common::test_utils::{mock_timestamp, report_fixtures::report};

    #[tokio::test]
    async fn test_create_user_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();

        let first = store.create_user("alice", 3600).await.unwrap();
        let second = store.create_user("alice", 0).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.daily_limit_kcal, 0);
        assert_eq!(first.timezone_offset_seconds, 3600);
        assert_eq!(store.load_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_daily_limit() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("alice", 0).await.unwrap();

        store.save_daily_limit(user.id, 2000).await.unwrap();

        let reloaded = store.find_user_by_name("alice").await.unwrap().unwrap();
        assert_eq!(reloaded.daily_limit_kcal, 2000);
        assert!(store.find_user_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_products_are_unique_per_pair() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.save_product(&Product::new("bread", 265)).await.unwrap();
        store.save_product(&Product::new("bread", 265)).await.unwrap();
        store.save_product(&Product::new("bread", 240)).await.unwrap();

        let products = store.load_products().await.unwrap();
        assert_eq!(
            products,
            vec![Product::new("bread", 240), Product::new("bread", 265)]
        );
    }

    #[tokio::test]
    async fn test_history_truncates_once_per_day() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("alice", 0).await.unwrap();

        // 0.5 + 0.5 kcal sums to 1 kcal for the day.
        store
            .save_report(user.id, &report(mock_timestamp(2024, 1, 1, 8, 0, 0), "gum", 1, 50))
            .await
            .unwrap();
        store
            .save_report(user.id, &report(mock_timestamp(2024, 1, 1, 9, 0, 0), "gum", 1, 50))
            .await
            .unwrap();

        let history = store
            .history_for_buckets(user.id, 0, &[19_723])
            .await
            .unwrap();
        assert_eq!(history.get(&19_723), Some(&1));
    }

    #[tokio::test]
    async fn test_history_uses_local_day_boundaries() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("alice", 0).await.unwrap();
        let late = mock_timestamp(2024, 1, 1, 22, 30, 0);
        store
            .save_report(user.id, &report(late, "pizza", 250, 200))
            .await
            .unwrap();

        let utc = store
            .history_for_buckets(user.id, 0, &[19_723, 19_724])
            .await
            .unwrap();
        assert_eq!(utc.get(&19_723), Some(&500));
        assert_eq!(utc.get(&19_724), None);

        let east = store
            .history_for_buckets(user.id, 3 * 3600, &[19_723, 19_724])
            .await
            .unwrap();
        assert_eq!(east.get(&19_723), None);
        assert_eq!(east.get(&19_724), Some(&500));
    }

    #[tokio::test]
    async fn test_history_before_epoch_floors() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("alice", 0).await.unwrap();
        store
            .save_report(user.id, &report(mock_timestamp(1969, 12, 31, 12, 0, 0), "egg", 150, 100))
            .await
            .unwrap();

        let history = store.history_for_buckets(user.id, 0, &[-1, 0]).await.unwrap();
        assert_eq!(history.get(&-1), Some(&150));
        assert_eq!(history.get(&0), None);
    }

    #[tokio::test]
    async fn test_history_with_no_buckets() {
        let store = SqliteStore::in_memory().await.unwrap();
        let history = store.history_for_buckets(UserId(1), 0, &[]).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_reports_for_bucket_are_ordered() {
        let store = SqliteStore::in_memory().await.unwrap();
        let alice = store.create_user("alice", 0).await.unwrap();
        let bob = store.create_user("bob", 0).await.unwrap();

        let evening = report(mock_timestamp(2024, 1, 1, 19, 0, 0), "soup", 41, 300);
        let morning = report(mock_timestamp(2024, 1, 1, 8, 0, 0), "apple", 52, 150);
        let next_day = report(mock_timestamp(2024, 1, 2, 8, 0, 0), "apple", 52, 150);
        store.save_report(alice.id, &evening).await.unwrap();
        store.save_report(alice.id, &morning).await.unwrap();
        store.save_report(alice.id, &next_day).await.unwrap();
        store.save_report(bob.id, &morning).await.unwrap();

        let reports = store.reports_for_bucket(alice.id, 0, 19_723).await.unwrap();
        assert_eq!(reports, vec![morning, evening]);
    }

    #[tokio::test]
    async fn test_recent_products_newest_first_without_duplicates() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("alice", 0).await.unwrap();

        for (hour, name, kcal) in [(8, "apple", 52), (9, "bread", 265), (10, "apple", 52), (11, "tea", 1)] {
            store
                .save_report(user.id, &report(mock_timestamp(2024, 1, 1, hour, 0, 0), name, kcal, 100))
                .await
                .unwrap();
        }

        let recent = store.recent_products(5).await.unwrap();
        assert_eq!(
            recent,
            vec![
                Product::new("tea", 1),
                Product::new("apple", 52),
                Product::new("bread", 265),
            ]
        );
        assert_eq!(store.recent_products(1).await.unwrap(), vec![Product::new("tea", 1)]);
    }
}
