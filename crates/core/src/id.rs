//! Unique identifiers for ClimaCode entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScanId(Ulid);

impl ScanId {
    /// Generate a new ScanId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ScanId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier of an authenticated account.
///
/// Accounts are issued by the hosting platform, so the id is opaque text
/// rather than something generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a platform-issued account id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Id encoded as a single path component.
    ///
    /// Lowercase ASCII letters, digits, `-` and `_` are kept; every other
    /// byte becomes `%XX` (uppercase hex). Uppercase letters are escaped as
    /// well, so the encoding stays one-to-one on case-insensitive file
    /// systems.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        for b in self.0.bytes() {
            if b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_' {
                stem.push(char::from(b));
            } else {
                stem.push_str(&format!("%{:02X}", b));
            }
        }
        stem
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a course module (1-based, as shown to learners).
pub type ModuleId = u32;

/// Zero-based position of a lesson inside its module.
pub type LessonIndex = u32;
