//! In-memory storage, for anonymous sessions and tests.

use std::collections::{BTreeMap, HashMap};

use climacode_core::{ModuleId, ModuleProgress, ScanId, ScanResult, UserId, UserProfile};

use super::trait_::{check_user, newest_first, scan_owner};
use super::{Result, Storage, StorageError};

/// Volatile storage backend. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    progress: HashMap<UserId, BTreeMap<ModuleId, ModuleProgress>>,
    scans: HashMap<UserId, HashMap<ScanId, ScanResult>>,
    profiles: HashMap<UserId, UserProfile>,
    read_only: bool,
}

impl MemoryStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse (or accept again) all writes.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(StorageError::Rejected("store is read-only".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn upsert_progress(&mut self, user: &UserId, progress: &ModuleProgress) -> Result<()> {
        self.check_writable()?;
        check_user(user)?;
        self.progress
            .entry(user.clone())
            .or_default()
            .insert(progress.module_id, progress.clone());
        Ok(())
    }

    async fn load_progress(&self, user: &UserId, module_id: ModuleId) -> Result<Option<ModuleProgress>> {
        Ok(self
            .progress
            .get(user)
            .and_then(|modules| modules.get(&module_id))
            .cloned())
    }

    async fn list_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>> {
        Ok(self
            .progress
            .get(user)
            .map(|modules| modules.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_scan(&mut self, scan: &ScanResult) -> Result<()> {
        self.check_writable()?;
        let owner = scan_owner(scan)?.clone();
        self.scans.entry(owner).or_default().insert(scan.id, scan.clone());
        Ok(())
    }

    async fn load_scan(&self, user: &UserId, id: ScanId) -> Result<Option<ScanResult>> {
        Ok(self.scans.get(user).and_then(|scans| scans.get(&id)).cloned())
    }

    async fn list_scans(&self, user: &UserId, limit: Option<usize>) -> Result<Vec<ScanResult>> {
        let all = self
            .scans
            .get(user)
            .map(|scans| scans.values().cloned().collect())
            .unwrap_or_default();
        Ok(newest_first(all, limit))
    }

    async fn upsert_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.check_writable()?;
        check_user(&profile.user_id)?;
        self.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn load_profile(&self, user: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(user).cloned())
    }
}
