//! Maps user-supplied wallet names and addresses to addresses to check.

use crate::address;
use crate::wallets::Wallets;

/// Display-name prefix for addresses that are not stored in the wallet file.
pub const EXTERNAL_PREFIX: &str = "External:";

/// Result of resolving user input against the wallet file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `(display name, address)` pairs in input order, unique by display name.
    pub targets: Vec<(String, String)>,
    /// Inputs that were neither a known wallet name nor an address.
    pub not_found: Vec<String>,
}

impl Resolution {
    fn insert(&mut self, name: String, address: String) {
        match self.targets.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = address,
            None => self.targets.push((name, address)),
        }
    }
}

/// Builds the display name used for an address that is not in the wallet file.
pub fn external_name(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(10).collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("{EXTERNAL_PREFIX} {head}...{tail}")
}

/// Resolves each input to a wallet to check.
///
/// Valid addresses resolve to the stored wallet with that address or, if none
/// exists, to a synthesized `External: ...` name. Anything else is looked up as
/// a wallet name. All comparisons ignore case; stored names and addresses keep
/// their stored casing.
pub fn resolve(inputs: &[String], wallets: &Wallets) -> Resolution {
    let mut resolution = Resolution::default();

    for input in inputs {
        if address::is_valid_address(input) {
            match wallets.find_by_address(input) {
                Some(record) => resolution.insert(record.name.clone(), record.address.clone()),
                None => resolution.insert(external_name(input), input.clone()),
            }
        } else {
            match wallets.find_by_name(input) {
                Some(record) => resolution.insert(record.name.clone(), record.address.clone()),
                None => resolution.not_found.push(input.clone()),
            }
        }
    }

    log::debug!(
        "Resolved inputs count={} targets={} not_found={}",
        inputs.len(),
        resolution.targets.len(),
        resolution.not_found.len()
    );
    resolution
}
