//! Command-line interface definitions.
//!
//! This module defines the CLI structure using `clap` derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for the wallet monitor.
#[derive(Parser)]
#[command(name = "tron-wallet-bot", about = "USDT (TRC20) wallet balance monitor")]
pub struct Cli {
    /// Wallet file to use instead of WALLETS_FILE
    #[arg(long, global = true)]
    pub wallets_file: Option<PathBuf>,
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
///
/// `Bot` runs the Telegram bot with its daily report; the other commands
/// operate once on the wallet file and exit.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the Telegram bot and the daily report scheduler
    Bot,
    /// Send the daily report to TELEGRAM_CHAT_ID right now
    Report,
    /// Print balances of all wallets, or of the given names/addresses
    Check {
        /// Wallet names or TRC20 addresses
        wallets: Vec<String>,
    },
    /// List configured wallets
    List,
    /// Add a wallet
    Add {
        /// Company the wallet belongs to
        company: String,
        /// Unique wallet name
        name: String,
        /// TRC20 address (starts with 'T', 34 characters)
        address: String,
    },
    /// Remove a wallet by name
    Remove {
        /// Wallet name
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_names() {
        let cli = Cli::parse_from(["tron-wallet-bot", "check", "KZP WDB2", "Acme Main"]);
        match cli.command {
            Commands::Check { wallets } => assert_eq!(wallets, vec!["KZP WDB2", "Acme Main"]),
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn wallets_file_is_global() {
        let cli = Cli::parse_from(["tron-wallet-bot", "list", "--wallets-file", "/tmp/w.json"]);
        assert_eq!(cli.wallets_file, Some(PathBuf::from("/tmp/w.json")));
    }

    #[test]
    fn add_requires_three_arguments() {
        assert!(Cli::try_parse_from(["tron-wallet-bot", "add", "Acme", "Main"]).is_err());
    }
}
