//! Wallet file persistence.
//!
//! Wallets live in a single JSON object keyed by wallet name:
//!
//! ```json
//! {
//!   "KZP WDB2": {
//!     "company": "KZP",
//!     "wallet": "KZP WDB2",
//!     "address": "TEhmKXCPgX64yjQ3t9skuSyUQBxwaWY4KS"
//!   }
//! }
//! ```
//!
//! The file is read afresh for every operation and rewritten in full on every
//! mutation. There is no locking: two processes editing the file at the same
//! time may lose one of the updates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::address;

/// A monitored wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    /// Unique display name.
    pub name: String,
    /// Owning company label, used for grouping.
    pub company: String,
    /// Tron address.
    pub address: String,
}

/// On-disk shape of a wallet entry. The name is the key of the enclosing map.
#[derive(Serialize, Deserialize)]
struct StoredWallet {
    #[serde(default)]
    company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wallet: Option<String>,
    address: String,
}

/// Errors returned by wallet mutations.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid TRC20 address. Address must start with 'T' and be 34 characters long.")]
    InvalidAddress,
    #[error("Wallet name cannot be empty.")]
    EmptyName,
    #[error("Wallet '{0}' already exists.")]
    NameTaken(String),
    #[error("Address already exists for wallet '{existing}'.")]
    AddressTaken { existing: String },
    #[error("Wallet '{0}' not found.")]
    NotFound(String),
    #[error("Failed to read wallet file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Wallet file {path} is corrupted: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("Failed to save wallet file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode wallet file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// An ordered snapshot of the wallet file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallets {
    records: Vec<WalletRecord>,
}

impl Wallets {
    pub fn new(records: Vec<WalletRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WalletRecord> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Finds a wallet by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&WalletRecord> {
        let needle = name.to_lowercase();
        self.records.iter().find(|r| r.name.to_lowercase() == needle)
    }

    /// Finds a wallet by address, ignoring case.
    pub fn find_by_address(&self, address: &str) -> Option<&WalletRecord> {
        let needle = address.to_lowercase();
        self.records
            .iter()
            .find(|r| r.address.to_lowercase() == needle)
    }

    /// Returns up to `limit` stored names containing `fragment`, ignoring case.
    pub fn similar_names(&self, fragment: &str, limit: usize) -> Vec<&str> {
        let needle = fragment.to_lowercase();
        self.names()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Returns every wallet as `(name, address)` pairs, in file order.
    pub fn addresses(&self) -> Vec<(String, String)> {
        self.records
            .iter()
            .map(|r| (r.name.clone(), r.address.clone()))
            .collect()
    }

    /// Parses the wallet file. The error names the first bad entry.
    fn from_json(data: &str) -> Result<Self, String> {
        let map: Map<String, Value> = serde_json::from_str(data).map_err(|e| e.to_string())?;
        let mut records = Vec::with_capacity(map.len());
        for (name, value) in map {
            let stored: StoredWallet = serde_json::from_value(value)
                .map_err(|e| format!("entry '{name}': {e}"))?;
            records.push(WalletRecord {
                name,
                company: stored.company,
                address: stored.address,
            });
        }
        Ok(Self::new(records))
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut map = Map::with_capacity(self.records.len());
        for record in &self.records {
            let stored = StoredWallet {
                company: record.company.clone(),
                wallet: Some(record.name.clone()),
                address: record.address.clone(),
            };
            map.insert(record.name.clone(), serde_json::to_value(stored)?);
        }
        serde_json::to_string_pretty(&map)
    }
}

/// Handle to the wallet JSON file.
#[derive(Debug, Clone)]
pub struct WalletStore {
    file_path: PathBuf,
}

impl WalletStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Reads the wallet file.
    ///
    /// A missing file is an empty wallet set.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Read`] if the file cannot be read and
    /// [`WalletError::Corrupt`] if it is not a valid wallet file. Callers
    /// must not save over a file that failed to load.
    pub fn load(&self) -> Result<Wallets, WalletError> {
        let path = self.path().display().to_string();

        let data = match fs::read_to_string(&self.file_path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("Wallet file does not exist, starting with empty state file={}", path);
                return Ok(Wallets::default());
            }
            Err(e) => {
                log::error!("Failed to read wallet file file={}: {}", path, e);
                return Err(WalletError::Read { path, source: e });
            }
        };

        let wallets = Wallets::from_json(&data).map_err(|reason| {
            log::error!("Failed to parse wallet JSON file={}: {}", path, reason);
            WalletError::Corrupt {
                path: path.clone(),
                reason,
            }
        })?;

        log::debug!("Loaded {} wallets from file={}", wallets.len(), path);
        Ok(wallets)
    }

    /// Writes `wallets` over the wallet file.
    ///
    /// The data goes to a sibling temp file which is then renamed over the
    /// target, so a failed write never leaves a truncated file behind.
    pub fn save(&self, wallets: &Wallets) -> Result<(), WalletError> {
        let data = wallets.to_json()?;
        let mut temp_path = self.file_path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        if let Err(e) = fs::write(&temp_path, data) {
            log::error!("Failed to write temp file file={}: {}", temp_path.display(), e);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &self.file_path) {
            log::error!(
                "Failed to rename temp file to {}: {}",
                self.file_path.display(),
                e
            );
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::info!(
            "Saved {} wallets to file={}",
            wallets.len(),
            self.file_path.display()
        );
        Ok(())
    }

    /// Adds a wallet and saves the file.
    ///
    /// Arguments are trimmed. The file is left untouched when validation
    /// fails.
    pub fn add(&self, company: &str, name: &str, address: &str) -> Result<WalletRecord, WalletError> {
        let (company, name, address) = (company.trim(), name.trim(), address.trim());

        if !address::is_valid_address(address) {
            return Err(WalletError::InvalidAddress);
        }
        if name.is_empty() {
            return Err(WalletError::EmptyName);
        }

        let mut wallets = self.load()?;
        if let Some(existing) = wallets.find_by_name(name) {
            return Err(WalletError::NameTaken(existing.name.clone()));
        }
        if let Some(existing) = wallets.find_by_address(address) {
            return Err(WalletError::AddressTaken {
                existing: existing.name.clone(),
            });
        }

        let record = WalletRecord {
            name: name.to_string(),
            company: company.to_string(),
            address: address.to_string(),
        };
        wallets.records.push(record.clone());
        self.save(&wallets)?;

        log::info!(
            "Wallet added company={} name={} address={}",
            record.company,
            record.name,
            record.address
        );
        Ok(record)
    }

    /// Removes the wallet called `name` (ignoring case) and saves the file.
    pub fn remove(&self, name: &str) -> Result<WalletRecord, WalletError> {
        let mut wallets = self.load()?;
        self.remove_from(&mut wallets, name)
    }

    /// Removes the wallet called `name` from `wallets` and saves the result.
    ///
    /// If the save fails the record is put back at its old position, so
    /// `wallets` keeps matching the unmodified file.
    pub fn remove_from(&self, wallets: &mut Wallets, name: &str) -> Result<WalletRecord, WalletError> {
        let needle = name.trim().to_lowercase();
        let Some(index) = wallets
            .records
            .iter()
            .position(|r| r.name.to_lowercase() == needle)
        else {
            log::debug!("Wallet not found for removal name={}", name);
            return Err(WalletError::NotFound(name.trim().to_string()));
        };

        let removed = wallets.records.remove(index);
        if let Err(e) = self.save(wallets) {
            wallets.records.insert(index, removed);
            return Err(e);
        }

        log::info!("Wallet removed name={} address={}", removed.name, removed.address);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: &str = "TEhmKXCPgX64yjQ3t9skuSyUQBxwaWY4KS";
    const ADDR_B: &str = "TNZJ5wTSMK4oR79CYzy8BGK6LWNmQxcuM8";

    fn temp_store() -> (tempfile::TempDir, WalletStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(WalletError::Corrupt { .. })));
    }

    #[test]
    fn bad_entry_is_named_in_load_error() {
        let (_dir, store) = temp_store();
        let data = format!(
            r#"{{"Keep Me": {{"company": "Acme", "address": "{ADDR_A}"}}, "Broken": {{"company": "X"}}}}"#
        );
        fs::write(store.path(), data).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(&err, WalletError::Corrupt { reason, .. } if reason.contains("'Broken'")));
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn edits_never_overwrite_a_corrupted_file() {
        let (_dir, store) = temp_store();
        let data = format!(
            r#"{{"Keep Me": {{"company": "Acme", "address": "{ADDR_A}"}}, "Broken": {{"company": "X"}}}}"#
        );
        fs::write(store.path(), &data).unwrap();

        let err = store.add("New", "New One", ADDR_B).unwrap_err();
        assert!(matches!(err, WalletError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), data);

        let err = store.remove("Keep Me").unwrap_err();
        assert!(matches!(err, WalletError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), data);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let (_dir, store) = temp_store();
        fs::create_dir(store.path()).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Read { .. })));
    }

    #[test]
    fn add_then_remove_round_trip() {
        let (_dir, store) = temp_store();
        let address = format!("T{}", "a".repeat(33));

        store.add("Acme", "Acme Main", &address).unwrap();
        let wallets = store.load().unwrap();
        let record = wallets.find_by_name("Acme Main").unwrap();
        assert_eq!(record.name, "Acme Main");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.address, address);

        store.remove("Acme Main").unwrap();
        assert!(store.load().unwrap().find_by_name("Acme Main").is_none());
    }

    #[test]
    fn invalid_address_does_not_touch_file() {
        let (_dir, store) = temp_store();
        store.add("KZP", "KZP WDB2", ADDR_A).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.add("Acme", "Acme Main", "0xdeadbeef").unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn duplicate_address_names_existing_wallet() {
        let (_dir, store) = temp_store();
        store.add("KZP", "KZP WDB2", ADDR_A).unwrap();

        let err = store
            .add("Other", "Other Main", &ADDR_A.to_lowercase().replacen('t', "T", 1))
            .unwrap_err();
        assert!(matches!(&err, WalletError::AddressTaken { existing } if existing == "KZP WDB2"));
        assert!(err.to_string().contains("KZP WDB2"));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_name_is_case_insensitive() {
        let (_dir, store) = temp_store();
        store.add("KZP", "KZP WDB2", ADDR_A).unwrap();

        let err = store.add("KZP", "kzp wdb2", ADDR_B).unwrap_err();
        assert!(matches!(err, WalletError::NameTaken(name) if name == "KZP WDB2"));
    }

    #[test]
    fn remove_unknown_wallet_fails() {
        let (_dir, store) = temp_store();
        store.add("KZP", "KZP WDB2", ADDR_A).unwrap();

        let err = store.remove("Nope").unwrap_err();
        assert!(matches!(err, WalletError::NotFound(name) if name == "Nope"));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn remove_ignores_case_and_returns_stored_record() {
        let (_dir, store) = temp_store();
        store.add("KZP", "KZP WDB2", ADDR_A).unwrap();

        let removed = store.remove("kzp wdb2").unwrap();
        assert_eq!(removed.name, "KZP WDB2");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn file_keeps_insertion_order_and_wallet_field() {
        let (_dir, store) = temp_store();
        store.add("Zeta", "Zeta One", ADDR_A).unwrap();
        store.add("Alpha", "Alpha One", ADDR_B).unwrap();

        let names: Vec<_> = store.load().unwrap().names().map(str::to_string).collect();
        assert_eq!(names, vec!["Zeta One", "Alpha One"]);

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["Zeta One"]["wallet"], "Zeta One");
        assert_eq!(raw["Alpha One"]["company"], "Alpha");
    }

    #[test]
    fn reads_records_without_wallet_field() {
        let (_dir, store) = temp_store();
        let data = format!(r#"{{"Main": {{"company": "Acme", "address": "{ADDR_A}"}}}}"#);
        fs::write(store.path(), data).unwrap();

        let wallets = store.load().unwrap();
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets.find_by_address(&ADDR_A.to_lowercase()).unwrap().name, "Main");
    }

    #[test]
    fn failed_save_restores_removed_record() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wallets.json");
        fs::create_dir(&target).unwrap();
        let store = WalletStore::new(&target);

        let mut wallets = Wallets::new(vec![
            WalletRecord {
                name: "First".into(),
                company: "Acme".into(),
                address: ADDR_A.into(),
            },
            WalletRecord {
                name: "Second".into(),
                company: "Acme".into(),
                address: ADDR_B.into(),
            },
        ]);
        let before = wallets.clone();

        let err = store.remove_from(&mut wallets, "First").unwrap_err();
        assert!(matches!(err, WalletError::Io(_)));
        assert_eq!(wallets, before);
    }

    #[test]
    fn similar_names_match_fragments() {
        let wallets = Wallets::new(vec![
            WalletRecord {
                name: "KZP WDB2".into(),
                company: "KZP".into(),
                address: ADDR_A.into(),
            },
            WalletRecord {
                name: "Acme Main".into(),
                company: "Acme".into(),
                address: ADDR_B.into(),
            },
        ]);
        assert_eq!(wallets.similar_names("wdb", 3), vec!["KZP WDB2"]);
        assert!(wallets.similar_names("zzz", 3).is_empty());
    }
}
