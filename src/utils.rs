use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

/// Formats a USDT amount with two decimal places and thousands separators,
/// e.g. `1234567.891` becomes `1,234,567.89`.
pub fn format_usdt(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{frac_part}")
}

/// Renders a fixed offset the way reports show it, e.g. `GMT+7` or `GMT-3:30`.
pub fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let hours = secs.abs() / 3600;
    let minutes = (secs.abs() % 3600) / 60;
    if minutes == 0 {
        format!("GMT{sign}{hours}")
    } else {
        format!("GMT{sign}{hours}:{minutes:02}")
    }
}

/// Formats `time` in `offset` as `YYYY-MM-DD HH:MM GMT+N`.
pub fn format_local(time: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "{} {}",
        time.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
        format_offset(offset)
    )
}

/// Returns the current time formatted in `offset`.
pub fn now_timestamp(offset: FixedOffset) -> String {
    format_local(Utc::now(), offset)
}
