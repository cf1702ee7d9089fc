//! Tron address validation.

/// Every base58check Tron mainnet address starts with this character.
pub const ADDRESS_PREFIX: char = 'T';

/// Length of a Tron address in its base58 form.
pub const ADDRESS_LEN: usize = 34;

/// Checks whether a string has the shape of a Tron (TRC20) address.
///
/// Only the prefix and the length are checked; the base58 checksum is not
/// verified.
///
/// # Examples
///
/// ```no_run
/// # use tron_wallet_bot::address::is_valid_address;
/// assert!(is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
/// assert!(!is_valid_address("0x1234"));
/// ```
pub fn is_valid_address(s: &str) -> bool {
    s.starts_with(ADDRESS_PREFIX) && s.chars().count() == ADDRESS_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_usdt_contract_address() {
        assert!(is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
    }

    #[test]
    fn rejects_wrong_prefix_or_length() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("T"));
        assert!(!is_valid_address("AR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
        assert!(!is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6"));
        assert!(!is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6tX"));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert!(!is_valid_address("tR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
    }
}
