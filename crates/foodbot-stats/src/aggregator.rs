//! Today and trailing-week summaries built from the ledger.

use chrono::{DateTime, Utc};
use foodbot_common::{day_bucket, format_bucket_label, trailing_buckets, DayBucket, Report, User};
use foodbot_ledger::{total_kcal, Ledger};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Number of days in the weekly summary, today included.
pub const WEEK_DAYS: u32 = 7;

/// A day stays within the limit while its total is strictly below it.
pub const fn in_limit(kcal: u64, daily_limit_kcal: u32) -> bool {
    kcal < daily_limit_kcal as u64
}

/// Everything eaten during the user's current local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    /// Local day of the summary.
    pub bucket: DayBucket,
    /// Entries of the day, ascending by time.
    pub reports: Vec<Report>,
    /// Day total, truncated once after summing.
    pub total_kcal: u64,
    /// The user's limit when the summary was taken.
    pub daily_limit_kcal: u32,
    /// Whether `total_kcal` is below the limit.
    pub in_limit: bool,
}

/// Total of one day in the weekly summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// Local day.
    pub bucket: DayBucket,
    /// Human label such as `Mon 2024/01/01`.
    pub label: String,
    /// Day total.
    pub kcal: u64,
    /// Whether `kcal` is below the limit.
    pub in_limit: bool,
}

/// The trailing week, today first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    /// Today's total.
    pub today_kcal: u64,
    /// Whether today is below the limit.
    pub today_in_limit: bool,
    /// The user's limit when the summary was taken.
    pub daily_limit_kcal: u32,
    /// Today followed by the six previous days.
    pub history: Vec<DaySummary>,
}

/// Composes ledger outputs into summaries. Holds no state of its own.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    ledger: Arc<Ledger>,
}

impl ReportAggregator {
    /// Creates an aggregator over the ledger.
    pub const fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Summary of the user's local day containing `now`.
    pub async fn today(&self, user: &User, now: DateTime<Utc>) -> TodaySummary {
        let bucket = day_bucket(now, user.timezone_offset_seconds);
        let reports = self.ledger.reports_for_bucket(user, bucket).await;
        let total = total_kcal(&reports);

        debug!(user = %user.name, bucket, entries = reports.len(), total, "Built today summary");

        TodaySummary {
            bucket,
            reports,
            total_kcal: total,
            daily_limit_kcal: user.daily_limit_kcal,
            in_limit: in_limit(total, user.daily_limit_kcal),
        }
    }

    /// Summary of the user's local day containing `now` and the six days before.
    pub async fn week(&self, user: &User, now: DateTime<Utc>) -> WeeklySummary {
        let buckets = trailing_buckets(day_bucket(now, user.timezone_offset_seconds), WEEK_DAYS);
        let totals = self.ledger.history_for_buckets(user, &buckets).await;

        let history: Vec<DaySummary> = buckets
            .iter()
            .map(|bucket| {
                let kcal = totals.get(bucket).copied().unwrap_or(0);
                DaySummary {
                    bucket: *bucket,
                    label: format_bucket_label(*bucket),
                    kcal,
                    in_limit: in_limit(kcal, user.daily_limit_kcal),
                }
            })
            .collect();

        let (today_kcal, today_in_limit) = history
            .first()
            .map_or((0, in_limit(0, user.daily_limit_kcal)), |day| {
                (day.kcal, day.in_limit)
            });

        WeeklySummary {
            today_kcal,
            today_in_limit,
            daily_limit_kcal: user.daily_limit_kcal,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_limit_is_strict() {
        assert!(in_limit(78, 2000));
        assert!(in_limit(1999, 2000));
        assert!(!in_limit(2000, 2000));
        assert!(!in_limit(2500, 2000));
        assert!(!in_limit(0, 0));
    }
}
