//! Tron Wallet Bot
//!
//! Monitors USDT (TRC20) balances of a set of named Tron wallets.
//!
//! # Features
//!
//! - **Telegram Bot**: `/check`, `/add`, `/remove` and `/list` for authorized users
//! - **Daily Report**: balance report sent to a chat at a fixed local time
//! - **CLI Mode**: check balances and edit the wallet file from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Check every wallet
//! tron-wallet-bot check
//!
//! # Run the Telegram bot
//! export TELEGRAM_BOT_TOKEN="your-token"
//! export AUTHORIZED_USERS="123456789"
//! export TELEGRAM_CHAT_ID="-1001234567890"
//! tron-wallet-bot bot
//! ```

mod address;
mod bot;
mod cli;
mod commands;
mod config;
mod quote;
mod report;
mod resolver;
mod scheduler;
mod tronscan;
mod utils;
mod wallets;

use clap::Parser;
use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Application started version={}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.wallets_file.clone() {
        config.wallets_file = path;
    }

    if let Err(e) = commands::run(cli, config).await {
        log::error!("Application error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
