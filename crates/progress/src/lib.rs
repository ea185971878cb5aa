//! Learning progress (EcoDev School)
//!
//! Per-learner lesson completion, quiz answers, module unlocking and badges.

#![warn(missing_docs)]

pub mod tracker;
pub mod achievements;

pub use tracker::{ModuleStatus, ProgressError, ProgressSummary, ProgressTracker, QuizOutcome};
pub use achievements::{
    all_quizzes_perfect, dashboard_achievements, school_achievements, Achievement, ScanActivity,
};
