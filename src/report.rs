//! Balance and wallet list reports.
//!
//! [`balance_report`] is shared by the `/check` command, the `check` CLI
//! command and the daily report, so all of them render balances the same way.

use chrono::FixedOffset;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::resolver::EXTERNAL_PREFIX;
use crate::tronscan::{self, BalanceSource};
use crate::utils;
use crate::wallets::Wallets;

/// Width of the wallet name column. Longer names wrap onto extra rows.
pub const NAME_WIDTH: usize = 20;

/// Title of on-demand balance checks.
pub const CHECK_TITLE: &str = "Wallet Balance Check";

/// Group label of addresses that are not stored in the wallet file.
const EXTERNAL_GROUP: &str = "EXT";

/// Returns the report group of a wallet.
///
/// External addresses go to `EXT`. Stored wallets use their company, falling
/// back to the first word of the name, even when that word is the whole name.
pub fn group_for(display_name: &str, wallets: &Wallets) -> String {
    if display_name.starts_with(EXTERNAL_PREFIX) {
        return EXTERNAL_GROUP.to_string();
    }

    if let Some(record) = wallets.find_by_name(display_name) {
        let company = record.company.trim();
        if !company.is_empty() {
            return company.to_uppercase();
        }
    }

    match display_name.split_whitespace().next() {
        Some(word) => word.to_uppercase(),
        None => display_name.chars().take(3).collect::<String>().to_uppercase(),
    }
}

/// Splits `text` into lines of at most `width` characters on word boundaries.
///
/// A word longer than `width` is cut to `width` characters.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word: String = word.chars().take(width).collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Renders fetched balances as a grouped table.
///
/// Rows are sorted by group and then by name. Failed lookups (`None`) are left
/// out of the table and the total, counted, and listed below it together with
/// any names that could not be resolved.
pub fn format_report(
    balances: &[(String, Option<Decimal>)],
    wallets: &Wallets,
    not_found: &[String],
) -> String {
    let mut rows: Vec<(String, &str, Decimal)> = Vec::new();
    let mut failed: Vec<&str> = Vec::new();
    let mut total = Decimal::ZERO;

    for (name, balance) in balances {
        match balance {
            Some(amount) => {
                total += *amount;
                rows.push((group_for(name, wallets), name.as_str(), *amount));
            }
            None => failed.push(name.as_str()),
        }
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let total_text = utils::format_usdt(total);
    let group_width = rows
        .iter()
        .map(|(group, _, _)| group.chars().count())
        .chain(["GROUP".len(), "TOTAL".len()])
        .max()
        .unwrap_or(0);
    let amount_width = rows
        .iter()
        .map(|(_, _, amount)| utils::format_usdt(*amount).len())
        .chain(["USDT".len(), total_text.len()])
        .max()
        .unwrap_or(0);
    let line_width = group_width + 2 + NAME_WIDTH + 2 + amount_width;

    let mut out = format!(
        "Wallets: {} | OK: {} | Failed: {}\n\n",
        balances.len(),
        rows.len(),
        failed.len()
    );

    out.push_str(&format!(
        "{:<gw$}  {:<nw$}  {:>aw$}\n",
        "GROUP",
        "WALLET",
        "USDT",
        gw = group_width,
        nw = NAME_WIDTH,
        aw = amount_width
    ));
    out.push_str(&"-".repeat(line_width));
    out.push('\n');

    let mut previous_group: Option<&str> = None;
    for (group, name, amount) in &rows {
        let group_label = if previous_group == Some(group.as_str()) {
            ""
        } else {
            group.as_str()
        };
        previous_group = Some(group.as_str());

        let amount_text = utils::format_usdt(*amount);
        for (i, line) in wrap_words(name, NAME_WIDTH).iter().enumerate() {
            let (label, value) = if i == 0 {
                (group_label, amount_text.as_str())
            } else {
                ("", "")
            };
            let row = format!(
                "{:<gw$}  {:<nw$}  {:>aw$}",
                label,
                line,
                value,
                gw = group_width,
                nw = NAME_WIDTH,
                aw = amount_width
            );
            out.push_str(row.trim_end());
            out.push('\n');
        }
    }

    out.push_str(&"-".repeat(line_width));
    out.push('\n');
    out.push_str(&format!(
        "{:<gw$}  {:<nw$}  {:>aw$}",
        "TOTAL",
        "",
        total_text,
        gw = group_width,
        nw = NAME_WIDTH,
        aw = amount_width
    ));

    let mut notes = Vec::new();
    if !failed.is_empty() {
        notes.push(format!("Failed to fetch: {}", failed.join(", ")));
    }
    if !not_found.is_empty() {
        notes.push(format!("Not found: {}", unique(not_found).join(", ")));
    }
    if !notes.is_empty() {
        out.push_str("\n\n");
        out.push_str(&notes.join("\n"));
    }

    out
}

fn unique(items: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        if !seen.contains(&item.as_str()) {
            seen.push(item.as_str());
        }
    }
    seen
}

/// Fetches balances for `targets` and renders them under `title`.
///
/// When every lookup fails a short failure message is returned instead of an
/// empty table.
pub async fn balance_report<S: BalanceSource>(
    source: &S,
    wallets: &Wallets,
    targets: &[(String, String)],
    not_found: &[String],
    title: &str,
    offset: FixedOffset,
) -> String {
    let balances = tronscan::fetch_many(source, targets).await;
    let successful = balances.iter().filter(|(_, b)| b.is_some()).count();
    log::info!(
        "Balance report built title={} wallets={} successful={}",
        title,
        balances.len(),
        successful
    );

    if successful == 0 {
        let mut message =
            "Unable to fetch any wallet balances. Please check the network connection.".to_string();
        if !not_found.is_empty() {
            message.push_str(&format!("\n\nNot found: {}", unique(not_found).join(", ")));
        }
        return message;
    }

    format!(
        "{}\nTime: {}\n\n{}",
        title,
        utils::now_timestamp(offset),
        format_report(&balances, wallets, not_found)
    )
}

/// Lists configured wallets grouped by company.
pub fn format_wallet_list(wallets: &Wallets) -> String {
    if wallets.is_empty() {
        return "No wallets configured.\n\nUse /add to add your first wallet.".to_string();
    }

    let mut companies: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
    for record in wallets.iter() {
        let company = match record.company.trim() {
            "" => "Unknown",
            company => company,
        };
        companies
            .entry(company)
            .or_default()
            .push((record.name.as_str(), record.address.as_str()));
    }

    let mut lines = vec![format!("Configured wallets ({} total)", wallets.len()), String::new()];
    for (company, entries) in companies {
        lines.push(company.to_string());
        for (name, address) in entries {
            lines.push(format!("  • {name}: {address}"));
        }
        lines.push(String::new());
    }
    lines.push("Use /check to see current balances.".to_string());

    lines.join("\n")
}
