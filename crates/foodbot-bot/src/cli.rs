//! Command-line arguments.

use clap::Parser;
use foodbot_config::Config;
use std::path::PathBuf;

/// Telegram bot for tracking daily calorie intake.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "foodbot", version, about)]
pub struct Cli {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level or filter directives, overriding the configuration
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// SQLite database path, overriding the configuration
    #[arg(long, value_name = "PATH")]
    pub database: Option<String>,
}

impl Cli {
    /// Applies flags given on the command line on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(path) = &self.database {
            config.database.path.clone_from(path);
        }
    }
}
