//! Runtime configuration.
//!
//! Settings come from environment variables (optionally loaded from a `.env`
//! file at startup). A single [`Config`] is built in `main` and handed to every
//! component that needs it.

use chrono::{FixedOffset, NaiveTime};
use std::path::PathBuf;
use std::time::Duration;

/// Default wallet file path.
pub const DEFAULT_WALLETS_FILE: &str = "wallets.json";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token. Only required by modes that talk to Telegram.
    pub bot_token: Option<String>,
    /// Telegram user ids allowed to use the bot.
    pub authorized_users: Vec<u64>,
    /// Chat that receives the daily report.
    pub report_chat_id: Option<i64>,
    /// Deployment label shown by `/start`.
    pub environment: String,
    /// Path of the wallet JSON file.
    pub wallets_file: PathBuf,
    /// Local time of day at which the daily report is sent.
    pub report_time: NaiveTime,
    /// Time zone used for report timestamps and scheduling.
    pub report_offset: FixedOffset,
    /// Timeout of a single balance request.
    pub api_timeout: Duration,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN"));

        let authorized_users = match get("AUTHORIZED_USERS").or_else(|| get("AUTHORIZED_USER")) {
            Some(raw) => parse_user_ids(&raw)?,
            None => Vec::new(),
        };

        let report_chat_id = get("TELEGRAM_CHAT_ID")
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|e| format!("Invalid TELEGRAM_CHAT_ID '{raw}': {e}"))
            })
            .transpose()?;

        let report_time = match get("REPORT_TIME") {
            Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| format!("Invalid REPORT_TIME '{raw}', expected HH:MM: {e}"))?,
            None => NaiveTime::MIN,
        };

        let offset_hours = match get("REPORT_UTC_OFFSET") {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|e| format!("Invalid REPORT_UTC_OFFSET '{raw}': {e}"))?,
            None => 7,
        };
        let report_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| format!("REPORT_UTC_OFFSET out of range: {offset_hours}"))?;

        let timeout_secs = match get("API_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("Invalid API_TIMEOUT_SECS '{raw}': {e}"))?,
            None => 10,
        };

        Ok(Self {
            bot_token,
            authorized_users,
            report_chat_id,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "DEV".to_string()),
            wallets_file: get("WALLETS_FILE")
                .unwrap_or_else(|| DEFAULT_WALLETS_FILE.to_string())
                .into(),
            report_time,
            report_offset,
            api_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Returns the bot token or an error naming the missing variable.
    pub fn require_bot_token(&self) -> Result<&str, String> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| "Missing required environment variable: TELEGRAM_BOT_TOKEN".to_string())
    }

    pub fn is_authorized(&self, user_id: u64) -> bool {
        self.authorized_users.contains(&user_id)
    }
}

fn parse_user_ids(raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| format!("Invalid user id '{s}' in AUTHORIZED_USERS: {e}"))
        })
        .collect()
}
