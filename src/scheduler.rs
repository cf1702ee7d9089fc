//! Daily balance report.
//!
//! Once a day, at the configured local time, a report covering every stored
//! wallet is sent to the report chat. Each run reads the wallet file afresh and
//! shares no state with interactive commands.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Utc};
use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::html;

use crate::config::Config;
use crate::report;
use crate::tronscan::TronscanClient;
use crate::utils;
use crate::wallets::{WalletError, WalletStore};

/// Title of the scheduled report.
pub const DAILY_REPORT_TITLE: &str = "Daily Balance Report";

/// Returns the first instant strictly after `now` whose local time in
/// `offset` is `at`.
pub fn next_run(now: DateTime<Utc>, at: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local_now = now.with_timezone(&offset).naive_local();
    let mut local_run = local_now.date().and_time(at);
    if local_run <= local_now {
        local_run += TimeDelta::days(1);
    }

    let utc_run = local_run - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    utc_run.and_utc()
}

/// Builds the daily report over every stored wallet.
///
/// Returns `Ok(None)` when no wallets are configured.
pub async fn daily_report(
    config: &Config,
    client: &TronscanClient,
) -> Result<Option<String>, WalletError> {
    let wallets = WalletStore::new(&config.wallets_file).load()?;
    if wallets.is_empty() {
        log::warn!("No wallets configured for daily report");
        return Ok(None);
    }

    log::info!("Generating daily report wallets={}", wallets.len());
    let targets = wallets.addresses();
    let message = report::balance_report(
        client,
        &wallets,
        &targets,
        &[],
        DAILY_REPORT_TITLE,
        config.report_offset,
    )
    .await;
    Ok(Some(message))
}

/// Builds the daily report and sends it to the report chat.
pub async fn send_daily_report(
    bot: &Bot,
    config: &Config,
    client: &TronscanClient,
) -> Result<(), String> {
    let chat_id = config
        .report_chat_id
        .ok_or_else(|| "TELEGRAM_CHAT_ID is not configured".to_string())?;

    let message = match daily_report(config, client).await {
        Ok(Some(message)) => message,
        Ok(None) => return Ok(()),
        Err(e) => {
            let notice = format!("❌ {DAILY_REPORT_TITLE} skipped: {e}");
            bot.send_message(ChatId(chat_id), notice)
                .await
                .map_err(|e| format!("Failed to send daily report to chat {chat_id}: {e}"))?;
            return Err(e.to_string());
        }
    };

    bot.send_message(ChatId(chat_id), html::code_block(&message))
        .parse_mode(ParseMode::Html)
        .await
        .map_err(|e| format!("Failed to send daily report to chat {chat_id}: {e}"))?;

    log::info!("Daily report sent chat_id={}", chat_id);
    Ok(())
}

/// Sends the daily report forever, sleeping until each scheduled time.
///
/// A failed run is logged and the loop waits for the next day.
pub async fn run(bot: Bot, config: Arc<Config>, client: TronscanClient) {
    loop {
        let now = Utc::now();
        let next = next_run(now, config.report_time, config.report_offset);
        log::info!(
            "Next daily report at {} ({})",
            utils::format_local(next, config.report_offset),
            next.format("%Y-%m-%d %H:%M UTC")
        );

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        log::info!("Starting scheduled daily report");
        if let Err(e) = send_daily_report(&bot, &config, &client).await {
            log::error!("Daily report failed: {}", e);
        }
    }
}
