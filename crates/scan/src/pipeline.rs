//! Scan pipeline: validate, measure, estimate, score, recommend, persist.

use std::sync::Arc;

use climacode_core::{
    Breakdown, ClimaConfig, PageSizeSource, RecommendationSource, ScanId, ScanResult, Session,
};
use climacode_storage::{Storage, StorageError};
use reqwest::Url;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::emissions::{co2_per_year_kg, SwdModel};
use crate::page::{HttpPageSizer, PageSizer};
use crate::recommend::{
    fallback_recommendations, GeminiRecommender, NoRecommender, RecommendationService, ScanSummary,
};
use crate::score::sustainability_score;

/// Label stored when no country was picked.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Error type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors raised by the scan pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// URL missing or not an http(s) URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Persisting the result failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A request to scan one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    /// Page address as typed
    pub url: String,
    /// Hosting country, if picked
    pub country: Option<String>,
}

impl ScanRequest {
    /// Request without a country.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            country: None,
        }
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Trim and check a URL. Only absolute http and https URLs are accepted.
pub fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidUrl("URL is required".to_string()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ScanError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            trimmed, other
        ))),
    }
}

/// Runs scans and stores the results of signed-in users.
pub struct ScanPipeline<S: Storage> {
    storage: Arc<Mutex<S>>,
    sizer: Arc<dyn PageSizer>,
    recommender: Arc<dyn RecommendationService>,
    model: SwdModel,
    annual_visits: u64,
    fallback_page_bytes: u64,
}

impl<S: Storage> ScanPipeline<S> {
    /// Pipeline with explicit collaborators.
    pub fn new(
        storage: Arc<Mutex<S>>,
        sizer: Arc<dyn PageSizer>,
        recommender: Arc<dyn RecommendationService>,
        config: &ClimaConfig,
    ) -> Self {
        Self {
            storage,
            sizer,
            recommender,
            model: SwdModel::with_grid_intensity(config.scan.grid_intensity),
            annual_visits: config.scan.annual_visits,
            fallback_page_bytes: config.scan.fallback_page_bytes,
        }
    }

    /// Pipeline using HTTP page sizing and, when a key is set, Gemini.
    pub fn from_config(storage: Arc<Mutex<S>>, config: &ClimaConfig) -> Self {
        let recommender: Arc<dyn RecommendationService> =
            match GeminiRecommender::from_config(&config.recommender) {
                Some(gemini) => Arc::new(gemini),
                None => {
                    info!("No Gemini API key configured, recommendations use the fixed list");
                    Arc::new(NoRecommender)
                }
            };
        Self::new(
            storage,
            Arc::new(HttpPageSizer::new(&config.scan)),
            recommender,
            config,
        )
    }

    /// Scan a page.
    ///
    /// Nothing is stored until every figure is computed. The result is
    /// saved only for signed-in sessions; a failed save is returned as an
    /// error and the result is discarded.
    pub async fn run(&self, session: &Session, request: ScanRequest) -> Result<ScanResult> {
        let url = validate_url(&request.url)?;
        let country = request
            .country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let (page_bytes, page_size_source) = match self.sizer.measure(&url).await {
            Ok(bytes) => (bytes, PageSizeSource::Measured),
            Err(e) => {
                warn!(
                    "Could not measure {} ({:#}), assuming {} bytes",
                    url, e, self.fallback_page_bytes
                );
                (self.fallback_page_bytes, PageSizeSource::Fallback)
            }
        };

        let co2_per_view_grams = self.model.co2_per_view_grams(page_bytes);
        let co2_per_year_kg = co2_per_year_kg(co2_per_view_grams, self.annual_visits);
        let score = sustainability_score(co2_per_view_grams);

        let summary = ScanSummary {
            url: url.clone(),
            country: country.clone(),
            co2_per_view_grams,
            page_bytes,
            sustainability_score: score,
        };
        let (recommendations, recommendation_source) =
            match self.recommender.recommend(&summary).await {
                Ok(recs) if !recs.is_empty() => (recs, RecommendationSource::Generated),
                Ok(_) => {
                    warn!("No recommendations generated for {}, using fallback list", url);
                    (fallback_recommendations(), RecommendationSource::Fallback)
                }
                Err(e) => {
                    warn!("Recommendation service failed for {} ({:#}), using fallback list", url, e);
                    (fallback_recommendations(), RecommendationSource::Fallback)
                }
            };

        let result = ScanResult {
            id: ScanId::new(),
            owner: session.user().cloned(),
            url,
            country_label: country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            page_bytes,
            page_size_source,
            co2_per_view_grams,
            co2_per_year_kg,
            sustainability_score: score,
            breakdown: Breakdown::typical(),
            recommendations,
            recommendation_source,
            created_at: chrono::Utc::now(),
        };

        if let Some(user) = session.user() {
            self.storage.lock().await.save_scan(&result).await?;
            info!(user = %user, scan = %result.id, "Scan of {} saved", result.url);
        }

        Ok(result)
    }

    /// Saved scans of the signed-in user, newest first.
    pub async fn history(&self, session: &Session, limit: Option<usize>) -> Result<Vec<ScanResult>> {
        match session.user() {
            Some(user) => Ok(self.storage.lock().await.list_scans(user, limit).await?),
            None => Ok(Vec::new()),
        }
    }
}
