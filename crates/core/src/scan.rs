//! Scan result model - one carbon estimate for one page.

use serde::{Deserialize, Serialize};
use crate::id::{ScanId, UserId};
use crate::round::round2;
use crate::Time;

/// Hosting locations offered when starting a scan.
pub const COUNTRIES: &[&str] = &[
    "United States", "Germany", "United Kingdom", "France", "Netherlands",
    "Singapore", "Japan", "Australia", "Canada", "Kazakhstan", "India", "Brazil",
];

/// The outcome of scanning a single URL.
///
/// Created once per scan request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique identifier
    pub id: ScanId,

    /// Owning account, `None` for anonymous scans
    pub owner: Option<UserId>,

    /// Scanned URL, as submitted (trimmed)
    pub url: String,

    /// Hosting country label chosen by the user
    pub country_label: String,

    /// Transferred page size used for the estimate
    pub page_bytes: u64,

    /// Where `page_bytes` came from
    pub page_size_source: PageSizeSource,

    /// Estimated grams of CO₂ per page view
    pub co2_per_view_grams: f64,

    /// Extrapolated kilograms of CO₂ per year
    pub co2_per_year_kg: f64,

    /// Sustainability score in [0, 1]
    pub sustainability_score: f64,

    /// Share of page weight per resource type
    pub breakdown: Breakdown,

    /// Ordered improvement suggestions
    pub recommendations: Vec<String>,

    /// Where `recommendations` came from
    pub recommendation_source: RecommendationSource,

    /// When the scan was made
    pub created_at: Time,
}

/// Resource-type composition of a page, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Share of images
    pub images: u8,
    /// Share of stylesheets
    pub css: u8,
    /// Share of scripts
    pub javascript: u8,
    /// Everything else (fonts, HTML, media)
    pub other: u8,
}

impl Breakdown {
    /// Composition of a typical page, used when no per-resource data exists.
    pub const fn typical() -> Self {
        Self {
            images: 42,
            css: 8,
            javascript: 35,
            other: 15,
        }
    }

    /// Sum of all shares.
    pub fn total(&self) -> u32 {
        u32::from(self.images) + u32::from(self.css) + u32::from(self.javascript) + u32::from(self.other)
    }
}

impl Default for Breakdown {
    fn default() -> Self {
        Self::typical()
    }
}

/// How the page size was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSizeSource {
    /// Fetched and measured
    Measured,
    /// Fetch failed; fixed fallback size used
    Fallback,
}

/// How the recommendations were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationSource {
    /// Produced by the text generation service
    Generated,
    /// Static fallback list
    Fallback,
}

/// Mean sustainability score of a history, 2 decimals; `None` when empty.
pub fn average_score(scans: &[ScanResult]) -> Option<f64> {
    if scans.is_empty() {
        return None;
    }
    let sum: f64 = scans.iter().map(|s| s.sustainability_score).sum();
    Some(round2(sum / scans.len() as f64))
}
