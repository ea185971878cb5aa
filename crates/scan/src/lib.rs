//! Carbon scanning (ClimaScan)
//!
//! Page weight to CO₂ estimate, sustainability score, recommendations and
//! impact statistics.

#![warn(missing_docs)]

pub mod score;
pub mod emissions;
pub mod page;
pub mod recommend;
pub mod pipeline;
pub mod impact;

pub use score::{certificate_eligible, sustainability_score, CERTIFICATE_THRESHOLD};
pub use emissions::{co2_per_year_kg, SwdModel};
pub use page::{HttpPageSizer, PageSizer};
pub use recommend::{
    fallback_recommendations, parse_recommendations, GeminiRecommender, NoRecommender,
    RecommendationService, ScanSummary, FALLBACK_RECOMMENDATIONS, MAX_RECOMMENDATIONS,
};
pub use pipeline::{validate_url, ScanError, ScanPipeline, ScanRequest, UNKNOWN_COUNTRY};
pub use impact::{ImpactStats, Milestone, ScoreBand};
