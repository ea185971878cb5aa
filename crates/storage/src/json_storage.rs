//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON file per record under the data directory:
//!
//! ```text
//! progress/<user>/<module>.json
//! scans/<user>/<scan id>.json
//! profiles/<user>.json
//! ```

use std::path::{Path, PathBuf};

use climacode_core::{ModuleId, ModuleProgress, ScanId, ScanResult, UserId, UserProfile};
use tokio::fs;
use tracing::debug;

use super::trait_::{check_user, newest_first, scan_owner};
use super::{Result, Storage};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the top-level record directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("progress")).await?;
        fs::create_dir_all(root.join("scans")).await?;
        fs::create_dir_all(root.join("profiles")).await?;

        Ok(Self { root })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn progress_dir(&self, user: &UserId) -> PathBuf {
        self.root.join("progress").join(user.file_stem())
    }
    fn progress_path(&self, user: &UserId, module_id: ModuleId) -> PathBuf {
        self.progress_dir(user).join(format!("{}.json", module_id))
    }
    fn scan_dir(&self, user: &UserId) -> PathBuf {
        self.root.join("scans").join(user.file_stem())
    }
    fn scan_path(&self, user: &UserId, id: ScanId) -> PathBuf {
        self.scan_dir(user).join(format!("{}.json", id))
    }
    fn profile_path(&self, user: &UserId) -> PathBuf {
        self.root.join("profiles").join(format!("{}.json", user.file_stem()))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn upsert_progress(&mut self, user: &UserId, progress: &ModuleProgress) -> Result<()> {
        check_user(user)?;
        fs::create_dir_all(self.progress_dir(user)).await?;
        write_json(&self.progress_path(user, progress.module_id), progress).await?;
        debug!(user = %user, module = progress.module_id, "progress saved");
        Ok(())
    }

    async fn load_progress(&self, user: &UserId, module_id: ModuleId) -> Result<Option<ModuleProgress>> {
        check_user(user)?;
        read_json(&self.progress_path(user, module_id)).await
    }

    async fn list_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>> {
        check_user(user)?;
        let mut all: Vec<ModuleProgress> = list_dir(&self.progress_dir(user)).await?;
        all.sort_by_key(|p| p.module_id);
        Ok(all)
    }

    async fn save_scan(&mut self, scan: &ScanResult) -> Result<()> {
        let owner = scan_owner(scan)?;
        fs::create_dir_all(self.scan_dir(owner)).await?;
        write_json(&self.scan_path(owner, scan.id), scan).await?;
        debug!(user = %owner, scan = %scan.id, "scan saved");
        Ok(())
    }

    async fn load_scan(&self, user: &UserId, id: ScanId) -> Result<Option<ScanResult>> {
        check_user(user)?;
        read_json(&self.scan_path(user, id)).await
    }

    async fn list_scans(&self, user: &UserId, limit: Option<usize>) -> Result<Vec<ScanResult>> {
        check_user(user)?;
        let all = list_dir(&self.scan_dir(user)).await?;
        Ok(newest_first(all, limit))
    }

    async fn upsert_profile(&mut self, profile: &UserProfile) -> Result<()> {
        check_user(&profile.user_id)?;
        write_json(&self.profile_path(&profile.user_id), profile).await
    }

    async fn load_profile(&self, user: &UserId) -> Result<Option<UserProfile>> {
        check_user(user)?;
        read_json(&self.profile_path(user)).await
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(items),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        // A corrupt record fails the whole listing; `None` only means the
        // file disappeared after the directory was read.
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use climacode_core::{Breakdown, PageSizeSource, RecommendationSource};

    fn scan(owner: Option<&str>, minutes_ago: i64) -> ScanResult {
        ScanResult {
            id: ScanId::new(),
            owner: owner.map(UserId::new),
            url: "https://example.com".to_string(),
            country_label: "Germany".to_string(),
            page_bytes: 1_000_000,
            page_size_source: PageSizeSource::Measured,
            co2_per_view_grams: 0.3,
            co2_per_year_kg: 3.0,
            sustainability_score: 0.8,
            breakdown: Breakdown::typical(),
            recommendations: vec!["Use green hosting".to_string()],
            recommendation_source: RecommendationSource::Fallback,
            created_at: chrono::Utc::now() - chrono::Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_progress_upsert_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("user-1");

        let mut progress = ModuleProgress::new(1);
        progress.completed_lessons.insert(0);
        storage.upsert_progress(&user, &progress).await.unwrap();

        progress.completed_lessons.insert(1);
        storage.upsert_progress(&user, &progress).await.unwrap();

        let loaded = storage.load_progress(&user, 1).await.unwrap().unwrap();
        assert_eq!(loaded.completed_lessons.len(), 2);
        assert_eq!(storage.list_progress(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_is_per_user_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        storage.upsert_progress(&alice, &ModuleProgress::new(2)).await.unwrap();
        storage.upsert_progress(&alice, &ModuleProgress::new(1)).await.unwrap();
        storage.upsert_progress(&bob, &ModuleProgress::new(3)).await.unwrap();

        let ids: Vec<_> = storage
            .list_progress(&alice)
            .await
            .unwrap()
            .iter()
            .map(|p| p.module_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(storage.list_progress(&UserId::new("carol")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scans_listed_newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("user-1");

        let old = scan(Some("user-1"), 30);
        let new = scan(Some("user-1"), 1);
        storage.save_scan(&old).await.unwrap();
        storage.save_scan(&new).await.unwrap();

        let listed = storage.list_scans(&user, None).await.unwrap();
        assert_eq!(listed[0].id, new.id);
        assert_eq!(listed[1].id, old.id);

        let limited = storage.list_scans(&user, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(storage.load_scan(&user, old.id).await.unwrap(), Some(old));
    }

    #[tokio::test]
    async fn test_anonymous_scan_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let err = storage.save_scan(&scan(None, 0)).await.unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_profile_roundtrip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("user-1");
        assert!(storage.load_profile(&user).await.unwrap().is_none());

        let mut profile = UserProfile::new(user.clone());
        profile.set_username("Greta");
        storage.upsert_profile(&profile).await.unwrap();
        assert_eq!(storage.load_profile(&user).await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_corrupt_record_surfaces_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("user-1");
        std::fs::create_dir_all(dir.path().join("progress/user-1")).unwrap();
        std::fs::write(dir.path().join("progress/user-1/1.json"), "{").unwrap();

        let err = storage.load_progress(&user, 1).await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[tokio::test]
    async fn test_similar_user_ids_keep_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let mut done = ModuleProgress::new(1);
        done.completed = true;
        storage.upsert_progress(&UserId::new("bob@x.com"), &done).await.unwrap();

        for other in ["bob_x_com", "bob.x.com", "Bob@x.com"] {
            assert!(storage.load_progress(&UserId::new(other), 1).await.unwrap().is_none());
        }
        assert!(storage.load_progress(&UserId::new("bob@x.com"), 1).await.unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let blank = UserId::new("");

        let err = storage.upsert_progress(&blank, &ModuleProgress::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
        assert!(matches!(storage.list_progress(&blank).await, Err(StorageError::Invalid(_))));
        assert!(matches!(storage.save_scan(&scan(Some(" "), 0)).await, Err(StorageError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_corrupt_record_fails_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("u");

        let mut done = ModuleProgress::new(1);
        done.completed = true;
        storage.upsert_progress(&user, &done).await.unwrap();
        storage.upsert_progress(&user, &ModuleProgress::new(2)).await.unwrap();
        std::fs::write(storage.progress_path(&user, 1), "{").unwrap();

        let err = storage.list_progress(&user).await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
