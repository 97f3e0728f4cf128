//! Named parameter profiles.
//!
//! A profile is a whole [`FundSnapshot`] stored under a name. Saves replace
//! the full record (last writer wins); loads fill missing keys with the
//! snapshot defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FidcError;
use crate::fund::FundSnapshot;
use crate::FidcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Persisted record: update time plus the flat snapshot keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub snapshot: FundSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Key-value persistence for snapshots.
pub trait ProfileStore {
    fn load(&self, name: &str) -> FidcResult<Option<FundSnapshot>>;

    fn save(&mut self, name: &str, snapshot: &FundSnapshot) -> FidcResult<()>;

    /// Returns whether a profile was removed.
    fn delete(&mut self, name: &str) -> FidcResult<bool>;

    /// Profiles sorted by name.
    fn list(&self) -> FidcResult<Vec<ProfileSummary>>;

    fn load_required(&self, name: &str) -> FidcResult<FundSnapshot> {
        self.load(name)?
            .ok_or_else(|| FidcError::ProfileNotFound(name.to_string()))
    }
}

fn validate_name(name: &str) -> FidcResult<()> {
    if name.trim().is_empty() {
        return Err(FidcError::InvalidInput {
            field: "name".into(),
            reason: "Profile name must not be empty".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: BTreeMap<String, StoredProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, name: &str) -> FidcResult<Option<FundSnapshot>> {
        Ok(self.profiles.get(name).map(|p| p.snapshot.clone()))
    }

    fn save(&mut self, name: &str, snapshot: &FundSnapshot) -> FidcResult<()> {
        validate_name(name)?;
        self.profiles.insert(
            name.to_string(),
            StoredProfile {
                updated_at: Some(Utc::now()),
                snapshot: snapshot.clone(),
            },
        );
        Ok(())
    }

    fn delete(&mut self, name: &str) -> FidcResult<bool> {
        Ok(self.profiles.remove(name).is_some())
    }

    fn list(&self) -> FidcResult<Vec<ProfileSummary>> {
        Ok(summaries(&self.profiles))
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// All profiles in one JSON object keyed by name. Every write rewrites the
/// file through a temporary sibling and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    path: PathBuf,
}

impl JsonFileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileProfileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> FidcResult<BTreeMap<String, StoredProfile>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, profiles: &BTreeMap<String, StoredProfile>) -> FidcResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(profiles)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = profiles.len(), "profiles written");
        Ok(())
    }
}

impl ProfileStore for JsonFileProfileStore {
    fn load(&self, name: &str) -> FidcResult<Option<FundSnapshot>> {
        Ok(self.read_all()?.remove(name).map(|p| p.snapshot))
    }

    fn save(&mut self, name: &str, snapshot: &FundSnapshot) -> FidcResult<()> {
        validate_name(name)?;
        let mut profiles = self.read_all()?;
        profiles.insert(
            name.to_string(),
            StoredProfile {
                updated_at: Some(Utc::now()),
                snapshot: snapshot.clone(),
            },
        );
        self.write_all(&profiles)?;
        info!(profile = name, "profile saved");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> FidcResult<bool> {
        let mut profiles = self.read_all()?;
        if profiles.remove(name).is_none() {
            return Ok(false);
        }
        self.write_all(&profiles)?;
        info!(profile = name, "profile deleted");
        Ok(true)
    }

    fn list(&self) -> FidcResult<Vec<ProfileSummary>> {
        Ok(summaries(&self.read_all()?))
    }
}

fn summaries(profiles: &BTreeMap<String, StoredProfile>) -> Vec<ProfileSummary> {
    profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            updated_at: p.updated_at,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_store() -> JsonFileProfileStore {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "fidc-profiles-{}-{}.json",
            std::process::id(),
            n
        ));
        let _ = fs::remove_file(&path);
        JsonFileProfileStore::new(path)
    }

    fn custom_snapshot() -> FundSnapshot {
        let mut snap = FundSnapshot::default();
        snap.structure.junior_principal = dec!(12_000_000);
        snap.risk.portfolio_yield = dec!(0.031);
        snap.include_provisioning = false;
        snap
    }

    #[test]
    fn test_memory_store_crud() {
        let mut store = MemoryProfileStore::new();
        assert_eq!(store.load("base").unwrap(), None);
        store.save("base", &custom_snapshot()).unwrap();
        assert_eq!(store.load("base").unwrap(), Some(custom_snapshot()));
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.delete("base").unwrap());
        assert!(!store.delete("base").unwrap());
    }

    #[test]
    fn test_load_required_reports_missing() {
        let store = MemoryProfileStore::new();
        let err = store.load_required("ghost").unwrap_err();
        assert!(matches!(err, FidcError::ProfileNotFound(ref n) if n == "ghost"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = MemoryProfileStore::new();
        assert!(store.save("  ", &FundSnapshot::default()).is_err());
    }

    #[test]
    fn test_file_store_round_trip_and_overwrite() {
        let mut store = temp_store();
        assert!(store.list().unwrap().is_empty());
        store.save("stress", &FundSnapshot::default()).unwrap();
        store.save("stress", &custom_snapshot()).unwrap();
        store.save("base", &FundSnapshot::default()).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["base".to_string(), "stress".to_string()]);
        assert_eq!(store.load("stress").unwrap(), Some(custom_snapshot()));
        assert!(!store.path().with_extension("json.tmp").exists());

        assert!(store.delete("stress").unwrap());
        assert_eq!(store.load("stress").unwrap(), None);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_fills_missing_keys() {
        let store = temp_store();
        fs::write(
            store.path(),
            r#"{ "legacy": { "junior_principal": "8000000", "reference_rate": "0.12" } }"#,
        )
        .unwrap();
        let snap = store.load("legacy").unwrap().unwrap();
        assert_eq!(snap.structure.junior_principal, dec!(8_000_000));
        assert_eq!(snap.risk.reference_rate, dec!(0.12));
        assert_eq!(snap.structure.senior_principal, dec!(20_000_000));
        assert_eq!(snap.aging_buckets.len(), 9);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let store = temp_store();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(
            store.load("x"),
            Err(FidcError::SerializationError(_))
        ));
        let _ = fs::remove_file(store.path());
    }
}
