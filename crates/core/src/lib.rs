//! ClimaCode core data models.
//!
//! This crate defines the records shared by the scanner, the progress
//! tracker and the storage backends, plus the course catalog and runtime
//! configuration.

#![warn(missing_docs)]

// Core identities
mod id;

// Records
mod scan;
mod progress;
mod profile;

// Course content
mod catalog;

// Numeric helpers
mod round;

// Context and configuration
mod session;
mod config;

// Re-exports
pub use id::*;

pub use scan::{
    average_score, ScanResult, Breakdown, PageSizeSource, RecommendationSource, COUNTRIES,
};
pub use round::{round1, round2, round3, round_half_up};
pub use progress::ModuleProgress;
pub use profile::UserProfile;
pub use catalog::{Catalog, CourseModule, Lesson, Quiz, Difficulty};
pub use session::{Session, Theme};
pub use config::{
    ClimaConfig, ScanConfig, RecommenderConfig, ConfigError,
    ENV_GEMINI_API_KEY, ENV_DATA_DIR,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
