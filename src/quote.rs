//! Quoted-argument parsing for bot commands.
//!
//! Wallet names may contain spaces, so every command argument must be wrapped
//! in double quotes. Telegram clients frequently replace straight quotes with
//! typographic ones, so those are normalized before parsing.

use regex::Regex;
use std::sync::LazyLock;

/// Matches one quoted span and captures its content.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("quoted span pattern is valid"));

/// Matches any character that is not a word character.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W").expect("non-word pattern is valid"));

/// Quote characters rewritten to a plain `"` before parsing.
const SMART_QUOTES: [char; 6] = [
    '\u{201C}', // left double quotation mark
    '\u{201D}', // right double quotation mark
    '\u{201E}', // double low-9 quotation mark
    '\u{201F}', // double high-reversed-9 quotation mark
    '\u{2033}', // double prime
    '\u{FF02}', // fullwidth quotation mark
];

/// Arguments of the `check` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckArgs {
    /// No arguments: every stored wallet is checked.
    All,
    /// Unique quoted wallet names or addresses, in the order given.
    Targets(Vec<String>),
    /// Text outside of quotes was found.
    Malformed,
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| if SMART_QUOTES.contains(&c) { '"' } else { c })
        .collect()
}

/// Extracts every double-quoted substring from `text`, trimmed.
///
/// Order and duplicates are preserved.
pub fn extract_quoted(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let normalized = normalize_quotes(text);
    QUOTED
        .captures_iter(&normalized)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Returns `true` if `text` has word characters outside of quoted spans.
///
/// Whitespace and punctuation outside of quotes are ignored.
pub fn has_unquoted_text(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let normalized = normalize_quotes(text);
    let outside = QUOTED.replace_all(&normalized, "");
    !NON_WORD.replace_all(&outside, "").is_empty()
}

/// Parses the argument text of the `check` command.
///
/// Empty quoted tokens are dropped and repeated tokens collapse to their
/// first occurrence.
pub fn parse_check_args(text: &str) -> CheckArgs {
    if text.trim().is_empty() {
        return CheckArgs::All;
    }

    let quoted = extract_quoted(text);
    if has_unquoted_text(text) || quoted.is_empty() {
        return CheckArgs::Malformed;
    }

    let mut targets: Vec<String> = Vec::new();
    for token in quoted {
        if !token.is_empty() && !targets.contains(&token) {
            targets.push(token);
        }
    }

    if targets.is_empty() {
        CheckArgs::All
    } else {
        CheckArgs::Targets(targets)
    }
}

/// Parses exactly `N` non-empty quoted arguments.
///
/// `labels` names each argument for the error message when it is empty.
///
/// # Errors
///
/// Returns a user-facing message when arguments are missing, when stray text
/// is found outside of quotes, when the number of quoted arguments is not `N`,
/// or when one of them is empty.
pub fn expect_quoted<const N: usize>(text: &str, labels: [&str; N]) -> Result<[String; N], String> {
    if text.trim().is_empty() {
        return Err("Missing arguments".to_string());
    }
    if has_unquoted_text(text) {
        return Err("All arguments must be wrapped in double quotes".to_string());
    }

    let args: [String; N] = extract_quoted(text).try_into().map_err(|found: Vec<String>| {
        let noun = if N == 1 { "argument" } else { "arguments" };
        format!("Expected {N} quoted {noun}, found {}", found.len())
    })?;

    if let Some(label) = labels
        .iter()
        .zip(&args)
        .find_map(|(label, arg)| arg.is_empty().then_some(label))
    {
        return Err(format!("{label} cannot be empty"));
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order_ignoring_whitespace() {
        assert_eq!(extract_quoted(r#"  "A"    "B"  "#), vec!["A", "B"]);
        assert_eq!(extract_quoted(r#""A""B""#), vec!["A", "B"]);
    }

    #[test]
    fn extracts_mixed_smart_and_straight_quotes() {
        assert_eq!(
            extract_quoted("/check \u{201C}Alpha Co\u{201D} \"Beta\""),
            vec!["Alpha Co", "Beta"]
        );
    }

    #[test]
    fn trims_and_keeps_duplicates() {
        assert_eq!(
            extract_quoted(r#"" KZP 96G1 " "KZP 96G1""#),
            vec!["KZP 96G1", "KZP 96G1"]
        );
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(extract_quoted("").is_empty());
        assert!(extract_quoted("   \t ").is_empty());
    }

    #[test]
    fn stray_word_is_unquoted_text() {
        assert!(has_unquoted_text(r#"foo "bar""#));
        assert!(has_unquoted_text("foo"));
        assert!(has_unquoted_text("\u{201C}a\u{201D} b"));
    }

    #[test]
    fn punctuation_and_whitespace_are_not_unquoted_text() {
        assert!(!has_unquoted_text(r#""foo" "bar""#));
        assert!(!has_unquoted_text(""));
        assert!(!has_unquoted_text("   "));
        assert!(!has_unquoted_text(" , ; - ! "));
        assert!(!has_unquoted_text(r#""a", "b"."#));
    }

    #[test]
    fn check_args_variants() {
        assert_eq!(parse_check_args(""), CheckArgs::All);
        assert_eq!(parse_check_args("  "), CheckArgs::All);
        assert_eq!(parse_check_args(r#""""#), CheckArgs::All);
        assert_eq!(parse_check_args(r#"foo "bar""#), CheckArgs::Malformed);
        assert_eq!(parse_check_args("KZP"), CheckArgs::Malformed);
        assert_eq!(parse_check_args("!!"), CheckArgs::Malformed);
        assert_eq!(
            parse_check_args(r#""b" "a" "b""#),
            CheckArgs::Targets(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn expect_quoted_counts_arguments() {
        let labels = ["Company", "Wallet name", "Address"];
        let args = expect_quoted(r#""Acme" "Acme Main" "T123""#, labels).unwrap();
        assert_eq!(args, ["Acme", "Acme Main", "T123"]);

        let err = expect_quoted(r#""Acme" "Acme Main""#, labels).unwrap_err();
        assert_eq!(err, "Expected 3 quoted arguments, found 2");

        let err = expect_quoted(r#""a" "b""#, ["Wallet name"]).unwrap_err();
        assert_eq!(err, "Expected 1 quoted argument, found 2");
    }

    #[test]
    fn expect_quoted_rejects_blank_and_stray_text() {
        let labels = ["Company", "Wallet name", "Address"];
        assert_eq!(expect_quoted("", labels).unwrap_err(), "Missing arguments");
        assert_eq!(
            expect_quoted(r#""Acme" " " "T123""#, labels).unwrap_err(),
            "Wallet name cannot be empty"
        );
        assert!(expect_quoted(r#"Acme "Acme Main" "T123""#, labels).is_err());
    }
}
