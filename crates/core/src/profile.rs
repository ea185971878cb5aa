//! Account profile shown on the dashboard.

use serde::{Deserialize, Serialize};
use crate::id::UserId;

/// Public profile of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning account
    pub user_id: UserId,

    /// Display name
    pub username: Option<String>,

    /// Public URL of the avatar image
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Empty profile for an account.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            avatar_url: None,
        }
    }

    /// Set the display name. Surrounding whitespace is dropped and a blank
    /// name clears it.
    pub fn set_username(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.username = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Heading for the profile page.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("My Profile")
    }
}
