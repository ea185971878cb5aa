//! Storage trait abstraction.

use async_trait::async_trait;
use climacode_core::{ModuleId, ModuleProgress, ScanId, ScanResult, UserId, UserProfile};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend refused the write
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Record cannot be stored as given
    #[error("invalid record: {0}")]
    Invalid(String),
}

/// Storage abstraction for ClimaCode records.
///
/// Every write is an upsert keyed by the record's composite key; the last
/// write wins. There are no cross-record transactions.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Module progress, keyed by (user, module) ===

    /// Insert or replace the progress record for a module.
    async fn upsert_progress(&mut self, user: &UserId, progress: &ModuleProgress) -> Result<()>;

    /// Load one module's progress.
    async fn load_progress(&self, user: &UserId, module_id: ModuleId) -> Result<Option<ModuleProgress>>;

    /// All progress records of a user, ordered by module id.
    async fn list_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>>;

    // === Scan results, keyed by (owner, scan id) ===

    /// Store a scan. Anonymous scans are rejected.
    async fn save_scan(&mut self, scan: &ScanResult) -> Result<()>;

    /// Load one scan.
    async fn load_scan(&self, user: &UserId, id: ScanId) -> Result<Option<ScanResult>>;

    /// Scans of a user, newest first, at most `limit` if given.
    async fn list_scans(&self, user: &UserId, limit: Option<usize>) -> Result<Vec<ScanResult>>;

    // === Profiles, keyed by user ===

    /// Insert or replace a profile.
    async fn upsert_profile(&mut self, profile: &UserProfile) -> Result<()>;

    /// Load a profile.
    async fn load_profile(&self, user: &UserId) -> Result<Option<UserProfile>>;
}

/// Reject ids that cannot key a record.
pub(crate) fn check_user(user: &UserId) -> Result<()> {
    if user.is_blank() {
        Err(StorageError::Invalid("user id is empty".to_string()))
    } else {
        Ok(())
    }
}

/// Owner of a scan, or the error explaining why it cannot be stored.
pub(crate) fn scan_owner(scan: &ScanResult) -> Result<&UserId> {
    let owner = scan
        .owner
        .as_ref()
        .ok_or_else(|| StorageError::Invalid(format!("scan {} has no owner", scan.id)))?;
    check_user(owner)?;
    Ok(owner)
}

/// Newest first, then truncate.
pub(crate) fn newest_first(mut scans: Vec<ScanResult>, limit: Option<usize>) -> Vec<ScanResult> {
    scans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    if let Some(limit) = limit {
        scans.truncate(limit);
    }
    scans
}
