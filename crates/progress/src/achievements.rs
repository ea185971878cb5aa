//! Achievement badges for the course page and the profile dashboard.

use std::collections::{BTreeMap, HashSet};

use climacode_core::{average_score, Catalog, ModuleId, ModuleProgress, ScanResult};
use serde::Serialize;

/// One badge and whether it has been earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    /// Stable identifier
    pub key: &'static str,
    /// Badge name
    pub title: &'static str,
    /// How to earn it
    pub description: &'static str,
    /// Emoji shown next to the title
    pub icon: &'static str,
    /// Whether the condition holds
    pub earned: bool,
}

impl Achievement {
    fn new(key: &'static str, title: &'static str, description: &'static str, icon: &'static str, earned: bool) -> Self {
        Self { key, title, description, icon, earned }
    }
}

/// Scan history figures the dashboard badges depend on.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScanActivity {
    /// Number of scans made
    pub scan_count: usize,
    /// Mean sustainability score, 2 decimals; `None` without scans
    pub average_score: Option<f64>,
    /// Number of different URLs scanned
    pub distinct_urls: usize,
}

impl ScanActivity {
    /// Summarize a scan history.
    pub fn from_scans(scans: &[ScanResult]) -> Self {
        let distinct_urls = scans.iter().map(|s| s.url.as_str()).collect::<HashSet<_>>().len();

        Self {
            scan_count: scans.len(),
            average_score: average_score(scans),
            distinct_urls,
        }
    }
}

/// Every quiz in the catalog answered correctly.
pub fn all_quizzes_perfect(catalog: &Catalog, progress: &BTreeMap<ModuleId, ModuleProgress>) -> bool {
    let mut quizzes = catalog.quizzes().peekable();
    if quizzes.peek().is_none() {
        return false;
    }
    quizzes.all(|(module, lesson, _)| {
        progress
            .get(&module)
            .and_then(|p| p.quiz_score(lesson))
            == Some(1)
    })
}

fn module_done(progress: &BTreeMap<ModuleId, ModuleProgress>, module: ModuleId) -> bool {
    progress.get(&module).map_or(false, |p| p.completed)
}

fn lessons_done(progress: &BTreeMap<ModuleId, ModuleProgress>) -> usize {
    progress.values().map(ModuleProgress::lessons_completed).sum()
}

/// Badges shown on the course page.
pub fn school_achievements(catalog: &Catalog, progress: &BTreeMap<ModuleId, ModuleProgress>) -> Vec<Achievement> {
    let modules_done = progress.values().filter(|p| p.completed).count();
    let all_modules = catalog.modules().len();

    vec![
        Achievement::new("first_lesson", "First Lesson", "Complete your first lesson", "🌱", lessons_done(progress) >= 1),
        Achievement::new("green_beginner", "Green Beginner", "Complete Module 1", "🌿", module_done(progress, 1)),
        Achievement::new("media_master", "Media Master", "Complete Module 2", "🖼️", module_done(progress, 2)),
        Achievement::new("code_optimizer", "Code Optimizer", "Complete Module 3", "⚡", module_done(progress, 3)),
        Achievement::new("green_hoster", "Green Hoster", "Complete Module 4", "🌐", module_done(progress, 4)),
        Achievement::new("performance_pro", "Performance Pro", "Complete Module 5", "🚀", module_done(progress, 5)),
        Achievement::new("carbon_cutter", "Carbon Cutter", "Score 100% on all quizzes", "✂️", all_quizzes_perfect(catalog, progress)),
        Achievement::new("eco_developer", "Eco Developer", "Complete all modules", "🏆", all_modules > 0 && modules_done >= all_modules),
    ]
}

/// Badges shown on the profile dashboard.
pub fn dashboard_achievements(activity: &ScanActivity, progress: &BTreeMap<ModuleId, ModuleProgress>) -> Vec<Achievement> {
    let green = activity.average_score.map_or(false, |avg| avg >= 0.7);

    vec![
        Achievement::new("first_scan", "First Scan", "Complete your first scan", "🔍", activity.scan_count >= 1),
        Achievement::new("carbon_tracker", "Carbon Tracker", "Complete 5 scans", "🌱", activity.scan_count >= 5),
        Achievement::new("green_champion", "Green Champion", "Avg score ≥ 0.7", "🏆", green),
        Achievement::new("eco_explorer", "Eco Explorer", "Scan 10+ different sites", "🌍", activity.distinct_urls >= 10),
        Achievement::new("first_lesson", "First Lesson", "Complete a lesson in EcoDev", "📚", lessons_done(progress) >= 1),
        Achievement::new("green_beginner", "Green Beginner", "Complete Module 1", "🌿", module_done(progress, 1)),
        Achievement::new("media_master", "Media Master", "Complete Module 2", "🖼️", module_done(progress, 2)),
        Achievement::new("code_optimizer", "Code Optimizer", "Complete Module 3", "⚡", module_done(progress, 3)),
    ]
}
