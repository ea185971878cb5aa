//! Per-session context: who is signed in and how the UI is themed.

use serde::{Deserialize, Serialize};
use crate::id::UserId;

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background (default)
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Context passed explicitly to every user-facing operation.
///
/// Created at session start; `sign_out` drops the account but keeps the
/// theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: Option<UserId>,
    theme: Theme,
}

impl Session {
    /// Session without an account.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a signed-in account.
    pub fn signed_in(user: UserId) -> Self {
        Self {
            user: Some(user),
            theme: Theme::default(),
        }
    }

    /// Attach an account.
    pub fn sign_in(&mut self, user: UserId) {
        self.user = Some(user);
    }

    /// Detach the account.
    pub fn sign_out(&mut self) {
        self.user = None;
    }

    /// Current account, if any.
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Whether an account is attached.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Current colour scheme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip between light and dark; returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}
