//! Impact statistics over a user's scan history.

use climacode_core::{average_score, round1, round3, ScanResult};
use serde::Serialize;

/// Grams of CO₂ one tree absorbs per year.
pub const TREE_GRAMS_PER_YEAR: f64 = 21_000.0;
/// Litres of water counted per gram of CO₂.
pub const WATER_LITRES_PER_GRAM: f64 = 0.5;

/// Colour band of a sustainability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    /// 0.7 and above
    Good,
    /// 0.4 up to 0.7
    Fair,
    /// Below 0.4
    Poor,
}

impl ScoreBand {
    /// Band for a score.
    pub fn of(score: f64) -> Self {
        if score >= 0.7 {
            ScoreBand::Good
        } else if score >= 0.4 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreBand::Good => write!(f, "good"),
            ScoreBand::Fair => write!(f, "fair"),
            ScoreBand::Poor => write!(f, "poor"),
        }
    }
}

/// A goal and how far along it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    /// What has to be reached
    pub target: &'static str,
    /// Emoji shown next to the target
    pub icon: &'static str,
    /// 0 to 100
    pub percent: f64,
}

/// Totals shown on the impact and profile pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactStats {
    /// Sum of per-view grams, 1 decimal
    pub total_co2_grams: f64,
    /// Number of scans
    pub scan_count: usize,
    /// Trees needed for a year to absorb the total, 3 decimals
    pub trees_equivalent: f64,
    /// Litres, 1 decimal
    pub water_litres: f64,
    /// Mean score, 2 decimals; `None` without scans
    pub average_score: Option<f64>,
    /// Progress towards the fixed goals
    pub milestones: Vec<Milestone>,
}

impl ImpactStats {
    /// Aggregate a scan history.
    pub fn from_scans(scans: &[ScanResult]) -> Self {
        let total: f64 = scans.iter().map(|s| s.co2_per_view_grams).sum();
        let count = scans.len();
        let total_co2_grams = round1(total);
        let milestones = vec![
            milestone("1kg CO₂ measured", "🌱", total_co2_grams / 1000.0),
            milestone("10 sites scanned", "🔍", count as f64 / 10.0),
            milestone("50 scans completed", "🌳", count as f64 / 50.0),
            milestone("100 scans completed", "🏆", count as f64 / 100.0),
        ];

        Self {
            total_co2_grams,
            scan_count: count,
            trees_equivalent: round3(total / TREE_GRAMS_PER_YEAR),
            water_litres: round1(total * WATER_LITRES_PER_GRAM),
            average_score: average_score(scans),
            milestones,
        }
    }

    /// Band of the average score.
    pub fn band(&self) -> Option<ScoreBand> {
        self.average_score.map(ScoreBand::of)
    }
}

fn milestone(target: &'static str, icon: &'static str, fraction: f64) -> Milestone {
    Milestone {
        target,
        icon,
        percent: (fraction * 100.0).min(100.0),
    }
}
