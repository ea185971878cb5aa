//! Sustainable Web Design (v3) emissions model.

use climacode_core::round2;
use serde::{Deserialize, Serialize};

/// Energy intensity of data transfer, kWh per GB.
pub const KWH_PER_GB: f64 = 0.81;
/// Share of visits from first-time visitors.
pub const FIRST_VISIT_SHARE: f64 = 0.75;
/// Share of visits from returning visitors.
pub const RETURNING_VISIT_SHARE: f64 = 0.25;
/// Fraction of the page a returning visitor downloads again.
pub const RETURNING_RELOAD_RATIO: f64 = 0.02;
/// Global average grid intensity, g CO₂e per kWh.
pub const GLOBAL_GRID_INTENSITY: f64 = 494.0;

const BYTES_PER_GB: f64 = 1_000_000_000.0;

/// Per-visit emissions estimate with caching of returning visits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwdModel {
    /// Grid intensity in g CO₂e per kWh
    pub grid_intensity: f64,
}

impl Default for SwdModel {
    fn default() -> Self {
        Self {
            grid_intensity: GLOBAL_GRID_INTENSITY,
        }
    }
}

impl SwdModel {
    /// Model with a custom grid intensity.
    pub fn with_grid_intensity(grid_intensity: f64) -> Self {
        Self { grid_intensity }
    }

    /// Grams of CO₂e for one visit to a page of `bytes`, unrounded.
    pub fn per_visit(&self, bytes: u64) -> f64 {
        let gb = bytes as f64 / BYTES_PER_GB;
        let transferred = FIRST_VISIT_SHARE + RETURNING_VISIT_SHARE * RETURNING_RELOAD_RATIO;
        gb * KWH_PER_GB * transferred * self.grid_intensity
    }

    /// Grams per view rounded to 2 decimals, as stored on a scan.
    pub fn co2_per_view_grams(&self, bytes: u64) -> f64 {
        round2(self.per_visit(bytes))
    }
}

/// Kilograms per year for a per-view figure, 2 decimals.
pub fn co2_per_year_kg(co2_per_view_grams: f64, annual_visits: u64) -> f64 {
    round2(co2_per_view_grams * annual_visits as f64 / 1000.0)
}
