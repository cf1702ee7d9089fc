//! Telegram bot implementation.
//!
//! Authorized users manage the wallet file and check USDT balances through
//! chat commands. All arguments are double-quoted so wallet names may contain
//! spaces. When a report chat is configured, a background task also sends the
//! daily balance report.
//!
//! # Bot Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Show available commands
//! - `/check ["name or address" ...]` - Check all or selected wallets
//! - `/add "company" "name" "address"` - Add a wallet
//! - `/remove "name"` - Remove a wallet
//! - `/list` - List configured wallets

use std::sync::Arc;
use teloxide::payloads::EditMessageTextSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;

use crate::config::Config;
use crate::quote::{self, CheckArgs};
use crate::report;
use crate::resolver;
use crate::scheduler;
use crate::tronscan::TronscanClient;
use crate::wallets::{WalletError, WalletStore, Wallets};

/// How many wallet names usage messages suggest.
const SUGGESTED_NAMES: usize = 5;

const CHECK_USAGE: &str = "Usage:
• /check - Check all wallets
• /check \"wallet_name\" - Check by wallet name
• /check \"TRC20_address\" - Check by address
• /check \"wallet1\" \"wallet2\" - Multiple wallets";

const ADD_USAGE: &str = "Usage: /add \"company\" \"wallet_name\" \"address\"
Example: /add \"KZP\" \"KZP WDB2\" \"TEhmKXCPgX64yjQ3t9skuSyUQBxwaWY4KS\"";

const REMOVE_USAGE: &str = "Usage: /remove \"wallet_name\"
Example: /remove \"KZP WDB2\"

Use /list to see available wallets.";

/// Telegram bot commands.
///
/// Commands taking arguments receive the raw text after the command so that
/// quoted arguments can be parsed by [`quote`].
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "display this text.")]
    Help,
    #[command(description = "start the bot and check the connection.")]
    Start,
    #[command(description = "check wallet balances, all or \"name\" / \"address\" ...")]
    Check(String),
    #[command(description = "add a wallet. Usage: /add \"company\" \"name\" \"address\"")]
    Add(String),
    #[command(description = "remove a wallet. Usage: /remove \"name\"")]
    Remove(String),
    #[command(description = "list configured wallets.")]
    List,
}

/// Dependencies shared by every command handler.
#[derive(Clone)]
struct BotState {
    config: Arc<Config>,
    client: TronscanClient,
}

impl BotState {
    fn store(&self) -> WalletStore {
        WalletStore::new(&self.config.wallets_file)
    }
}

/// Starts the Telegram bot and, if a report chat is configured, the daily
/// report task.
///
/// # Errors
///
/// Returns `Err(String)` if the bot token is missing or the HTTP client cannot
/// be built.
pub async fn run(config: Arc<Config>) -> Result<(), String> {
    log::info!("Starting bot environment={}", config.environment);

    let bot = Bot::new(config.require_bot_token()?);
    let client = TronscanClient::new(config.api_timeout)?;

    if config.authorized_users.is_empty() {
        log::warn!("AUTHORIZED_USERS is empty, every command will be rejected");
    }

    match config.report_chat_id {
        Some(chat_id) => {
            log::info!("Daily report enabled chat_id={}", chat_id);
            tokio::spawn(scheduler::run(bot.clone(), config.clone(), client.clone()));
        }
        None => log::warn!("TELEGRAM_CHAT_ID not set, daily report disabled"),
    }

    let state = BotState { config, client };

    Command::repl(bot, move |bot: Bot, msg: Message, cmd: Command| {
        let state = state.clone();
        async move { answer(bot, msg, cmd, state).await }
    })
    .await;

    Ok(())
}

/// Handles one command.
///
/// User mistakes and store failures are answered in the chat; only Telegram
/// request failures are returned as errors.
async fn answer(bot: Bot, msg: Message, cmd: Command, state: BotState) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    if !state.config.is_authorized(user.id.0) {
        log::warn!(
            "Unauthorized access attempt user={} user_id={}",
            user.first_name,
            user.id.0
        );
        bot.send_message(msg.chat.id, "❌ You are not authorized to use this bot.")
            .await?;
        return Ok(());
    }

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            let text = format!(
                "Crypto Wallet Monitor Bot is running!\n\n\
                 Hello {}!\n\n\
                 This bot monitors USDT (TRC20) wallet balances.\n\n\
                 Environment: {}\n\
                 Status: ✅ Connected and ready\n\n\
                 Try /help to see available commands.",
                user.first_name, state.config.environment
            );
            bot.send_message(msg.chat.id, text).await?;
        }
        Command::Check(args) => check(&bot, &msg, &args, &state).await?,
        Command::Add(args) => add(&bot, &msg, &args, &state).await?,
        Command::Remove(args) => remove(&bot, &msg, &args, &state).await?,
        Command::List => {
            let text = match state.store().load() {
                Ok(wallets) => report::format_wallet_list(&wallets),
                Err(e) => format!("❌ {e}"),
            };
            bot.send_message(msg.chat.id, text).await?;
        }
    }

    log::info!("Command handled user_id={} chat_id={}", user.id.0, msg.chat.id);
    Ok(())
}

/// Up to [`SUGGESTED_NAMES`] wallet names, with `...` if there are more.
fn available_names(wallets: &Wallets) -> String {
    let mut names = wallets
        .names()
        .take(SUGGESTED_NAMES)
        .collect::<Vec<_>>()
        .join(", ");
    if wallets.len() > SUGGESTED_NAMES {
        names.push_str("...");
    }
    names
}

async fn check(bot: &Bot, msg: &Message, args: &str, state: &BotState) -> ResponseResult<()> {
    let wallets = match state.store().load() {
        Ok(wallets) => wallets,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {e}")).await?;
            return Ok(());
        }
    };
    if wallets.is_empty() {
        bot.send_message(msg.chat.id, "❌ No wallets configured.\n\nUse /add to add your first wallet.")
            .await?;
        return Ok(());
    }

    let (targets, not_found) = match quote::parse_check_args(args) {
        CheckArgs::Malformed => {
            log::warn!("Rejected check arguments args={}", args);
            let text = format!(
                "❌ No valid wallet names or addresses found in: {}\n\n\
                 Note: all wallet names and addresses must be in quotes!\n\n\
                 {}\n\nAvailable wallet names:\n{}",
                args.trim(),
                CHECK_USAGE,
                available_names(&wallets)
            );
            bot.send_message(msg.chat.id, text).await?;
            return Ok(());
        }
        CheckArgs::All => (wallets.addresses(), Vec::new()),
        CheckArgs::Targets(inputs) => {
            let resolution = resolver::resolve(&inputs, &wallets);
            if resolution.targets.is_empty() {
                let text = format!(
                    "❌ Wallet name(s) not found: {}\n\nAvailable wallet names:\n{}\n\n\
                     Use /list to see all wallets or provide TRC20 addresses directly.",
                    resolution.not_found.join(", "),
                    available_names(&wallets)
                );
                bot.send_message(msg.chat.id, text).await?;
                return Ok(());
            }
            (resolution.targets, resolution.not_found)
        }
    };

    let pending = bot.send_message(msg.chat.id, "🔄 Checking balances...").await?;
    let text = report::balance_report(
        &state.client,
        &wallets,
        &targets,
        &not_found,
        report::CHECK_TITLE,
        state.config.report_offset,
    )
    .await;

    bot.edit_message_text(msg.chat.id, pending.id, html::code_block(&text))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn add(bot: &Bot, msg: &Message, args: &str, state: &BotState) -> ResponseResult<()> {
    let [company, name, address] = match quote::expect_quoted(args, ["Company", "Wallet name", "Address"]) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Rejected add arguments args={}: {}", args, e);
            bot.send_message(msg.chat.id, format!("❌ {e}\n\n{ADD_USAGE}"))
                .await?;
            return Ok(());
        }
    };

    let text = match state.store().add(&company, &name, &address) {
        Ok(record) => format!(
            "✅ Wallet added successfully\n\n\
             Company: {}\nWallet: {}\nAddress: {}\n\n\
             Use /check to see the current balance.",
            record.company, record.name, record.address
        ),
        Err(e) => {
            log::warn!("Add wallet failed name={}: {}", name, e);
            format!("❌ {e}")
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn remove(bot: &Bot, msg: &Message, args: &str, state: &BotState) -> ResponseResult<()> {
    let [name] = match quote::expect_quoted(args, ["Wallet name"]) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Rejected remove arguments args={}: {}", args, e);
            bot.send_message(msg.chat.id, format!("❌ {e}\n\n{REMOVE_USAGE}"))
                .await?;
            return Ok(());
        }
    };

    let store = state.store();
    let mut wallets = match store.load() {
        Ok(wallets) => wallets,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {e}")).await?;
            return Ok(());
        }
    };
    let text = match store.remove_from(&mut wallets, &name) {
        Ok(record) => format!(
            "✅ Wallet removed successfully\n\n\
             Wallet: {}\nCompany: {}\n\n\
             Use /list to see remaining wallets.",
            record.name, record.company
        ),
        Err(WalletError::NotFound(_)) => {
            let mut text = format!("❌ Wallet {name} not found");
            let similar = wallets.similar_names(&name, 3);
            if !similar.is_empty() {
                text.push_str(&format!("\n\nDid you mean: {}", similar.join(", ")));
            }
            text.push_str("\n\nUse /list to see all available wallets.");
            text
        }
        Err(e) => {
            log::error!("Remove wallet failed name={}: {}", name, e);
            format!("❌ {e}")
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
