//! Command execution logic.
//!
//! Routes each CLI command either to the Telegram bot or to a one-shot
//! operation on the wallet file.

use std::sync::Arc;
use teloxide::Bot;

use crate::bot;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::report;
use crate::resolver;
use crate::scheduler;
use crate::tronscan::TronscanClient;
use crate::wallets::WalletStore;

/// Executes the CLI command specified in the parsed arguments.
///
/// # Errors
///
/// Returns `Err(String)` if:
/// - A wallet edit is rejected or cannot be saved
/// - None of the requested wallets exist
/// - The bot token or report chat is missing (for bot and report modes)
pub async fn run(cli: Cli, config: Config) -> Result<(), String> {
    let store = WalletStore::new(&config.wallets_file);

    match cli.command {
        Commands::Bot => {
            bot::run(Arc::new(config)).await?;
        }
        Commands::Report => {
            let bot = Bot::new(config.require_bot_token()?);
            let client = TronscanClient::new(config.api_timeout)?;
            scheduler::send_daily_report(&bot, &config, &client).await?;
        }
        Commands::Check { wallets: inputs } => {
            let wallets = store.load().map_err(|e| e.to_string())?;
            let inputs = clean_inputs(inputs);
            let (targets, not_found) = if inputs.is_empty() {
                (wallets.addresses(), Vec::new())
            } else {
                let resolution = resolver::resolve(&inputs, &wallets);
                (resolution.targets, resolution.not_found)
            };

            if targets.is_empty() {
                if not_found.is_empty() {
                    println!("No wallets configured. Use `add` to add your first wallet.");
                    return Ok(());
                }
                return Err(format!("Wallet name(s) not found: {}", not_found.join(", ")));
            }

            let client = TronscanClient::new(config.api_timeout)?;
            let text = report::balance_report(
                &client,
                &wallets,
                &targets,
                &not_found,
                report::CHECK_TITLE,
                config.report_offset,
            )
            .await;
            println!("{text}");
        }
        Commands::List => {
            let wallets = store.load().map_err(|e| e.to_string())?;
            println!("{}", report::format_wallet_list(&wallets));
        }
        Commands::Add {
            company,
            name,
            address,
        } => {
            let record = store
                .add(&company, &name, &address)
                .map_err(|e| e.to_string())?;
            println!(
                "Added {} ({}) {}",
                record.name, record.company, record.address
            );
        }
        Commands::Remove { name } => {
            let record = store.remove(&name).map_err(|e| e.to_string())?;
            println!("Removed {} ({})", record.name, record.company);
        }
    }
    Ok(())
}

/// Trims shell arguments, dropping blank and repeated ones.
///
/// An empty result means every stored wallet, as with a bare `/check`.
fn clean_inputs(inputs: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input = input.trim();
        if !input.is_empty() && !cleaned.iter().any(|c| c == input) {
            cleaned.push(input.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn check_inputs_are_trimmed_and_deduplicated() {
        assert_eq!(
            clean_inputs(args(&[" KZP WDB2", "Acme ", "KZP WDB2"])),
            args(&["KZP WDB2", "Acme"])
        );
    }

    #[test]
    fn blank_check_inputs_mean_every_wallet() {
        assert!(clean_inputs(args(&["", "   "])).is_empty());
    }

    #[tokio::test]
    async fn check_refuses_a_corrupted_wallet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = Config {
            wallets_file: path,
            ..Config::from_lookup(|_| None).unwrap()
        };
        let cli = Cli {
            wallets_file: None,
            command: Commands::Check { wallets: Vec::new() },
        };

        let err = run(cli, config).await.unwrap_err();
        assert!(err.contains("corrupted"));
    }
}
