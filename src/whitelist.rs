//! Persisted whitelist of addresses exempt from detection and reclaim.
//!
//! The document is a flat JSON file `{accounts: [..], programs: [..]}`
//! rewritten wholesale on save. The core reads it once at scanner
//! construction; changing the set requires rebuilding the scanner.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// On-disk shape of the whitelist document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhitelistFile {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub programs: Vec<String>,
}

/// File-backed whitelist store.
#[derive(Debug, Clone)]
pub struct WhitelistStore {
    path: PathBuf,
}

impl WhitelistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whitelist document. A missing file is an empty whitelist;
    /// an unreadable or malformed file is logged and treated as empty so a
    /// corrupt document can never block scanning.
    pub fn load(&self) -> WhitelistFile {
        if !self.path.exists() {
            return WhitelistFile::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "could not parse whitelist, treating as empty");
                    WhitelistFile::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read whitelist, treating as empty");
                WhitelistFile::default()
            }
        }
    }

    /// Load just the protected account set, the view the scanner consumes.
    pub fn load_accounts(&self) -> HashSet<String> {
        self.load().accounts.into_iter().collect()
    }

    /// Rewrite the whole document. Used by the dashboard, not by the core.
    pub fn save(&self, file: &WhitelistFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write whitelist to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> WhitelistStore {
        let mut path = std::env::temp_dir();
        path.push(format!("rentops_whitelist_{}_{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        WhitelistStore::new(path)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = temp_store("missing");
        assert_eq!(store.load(), WhitelistFile::default());
        assert!(store.load_accounts().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = temp_store("roundtrip");
        let file = WhitelistFile {
            accounts: vec!["Addr1".into(), "Addr2".into()],
            programs: vec!["Prog1".into()],
        };
        store.save(&file).unwrap();

        assert_eq!(store.load(), file);
        let accounts = store.load_accounts();
        assert!(accounts.contains("Addr1"));
        assert!(accounts.contains("Addr2"));
        assert_eq!(accounts.len(), 2);

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), WhitelistFile::default());
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_partial_document_defaults_missing_fields() {
        let store = temp_store("partial");
        fs::write(store.path(), r#"{"accounts": ["OnlyAccounts"]}"#).unwrap();
        let file = store.load();
        assert_eq!(file.accounts, vec!["OnlyAccounts".to_string()]);
        assert!(file.programs.is_empty());
        let _ = fs::remove_file(store.path());
    }
}
