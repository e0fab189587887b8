//! Test utilities and shared test helpers for FoodBot.
//!
//! This module provides common testing utilities, fixtures, and helper functions
//! that can be used across all crates in the workspace for unit and integration testing.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tokio::runtime::Runtime;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
#[cfg(feature = "tracing-subscriber")]
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// No-op version when tracing-subscriber is not available
#[cfg(not(feature = "tracing-subscriber"))]
pub fn init_test_logging() {
    INIT.call_once(|| {});
}

/// Create a tokio runtime for testing async functions.
/// This is useful for tests that need to run async code in a synchronous test context,
/// such as proptest bodies.
pub fn create_test_runtime() -> Runtime {
    Runtime::new().expect("Failed to create test runtime")
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Intake fixtures shared by ledger, stats, and dialogue tests.
pub mod report_fixtures {
    use crate::{Product, Report};
    use chrono::{DateTime, Utc};

    /// A report for `grams` of `product` at `timestamp`.
    pub fn report(timestamp: DateTime<Utc>, product: &str, kcal: u32, grams: u32) -> Report {
        Report {
            timestamp,
            product_name: product.to_string(),
            kcal_per_100g: kcal,
            grams,
        }
    }

    /// A handful of distinct products.
    pub fn sample_products() -> Vec<Product> {
        vec![
            Product::new("apple", 52),
            Product::new("banana", 89),
            Product::new("bread", 265),
            Product::new("bread", 240),
            Product::new("cheese", 402),
        ]
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
telegram:
  token: "123456:test_token"
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "telegram:\n",
            "  token: \"123456:test_token_full\"\n",
            "  debug: true\n",
            "\n",
            "database:\n",
            "  path: \"/var/lib/foodbot/foodbot.db\"\n",
            "  max_connections: 8\n",
            "\n",
            "dialogue:\n",
            "  recent_products: 3\n",
            "  default_timezone_offset_seconds: 10800\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  json: true\n",
            "  directory: \"/var/log/foodbot\"\n"
        )
    }

    /// Create a full test configuration as TOML string.
    pub fn full_config_toml() -> &'static str {
        concat!(
            "[telegram]\n",
            "token = \"123456:test_token_toml\"\n",
            "\n",
            "[database]\n",
            "path = \"foodbot-toml.db\"\n",
            "max_connections = 2\n",
            "\n",
            "[dialogue]\n",
            "recent_products = 5\n",
            "default_timezone_offset_seconds = -18000\n",
            "\n",
            "[logging]\n",
            "level = \"warn\"\n"
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for free-text product names as users type them.
    pub fn raw_product_name_strategy() -> impl Strategy<Value = String> {
        r#"[ \t\n,."']{0,3}[A-Za-z][A-Za-z ]{0,15}[A-Za-z][ \t\n,."']{0,3}"#.prop_map(|s| s.to_string())
    }

    /// Strategy for energy values in kcal per 100g.
    pub fn kcal_strategy() -> impl Strategy<Value = u32> {
        0u32..=900
    }

    /// Strategy for positive portion sizes in grams.
    pub fn grams_strategy() -> impl Strategy<Value = u32> {
        1u32..=2_000
    }

    /// Strategy for UTC offsets within the range used by real timezones.
    pub fn timezone_offset_strategy() -> impl Strategy<Value = i32> {
        (-12 * 3600)..=(14 * 3600)
    }
}
