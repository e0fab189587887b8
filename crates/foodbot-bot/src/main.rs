//! Main entry point for FoodBot.

use clap::Parser;
use foodbot_bot::{init_logging, BotResult, Cli, FoodBot};
use foodbot_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> BotResult<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let _guard = init_logging(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting FoodBot");

    let bot = match FoodBot::new(config).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to open the ledger: {}", e);
            return Err(e);
        }
    };

    if let Err(e) = bot.start().await {
        error!("Bot stopped with an error: {}", e);
        return Err(e);
    }

    info!("FoodBot shut down");
    Ok(())
}
