//! Optimization recommendations for a scanned page.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use climacode_core::RecommenderConfig;
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, warn};

/// Most recommendations kept from a generator.
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Header carrying the Gemini API key. Kept out of the URL so transport
/// errors, which quote the URL, never contain the key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Used whenever nothing could be generated.
pub const FALLBACK_RECOMMENDATIONS: [&str; 4] = [
    "Optimize images — Convert to WebP and compress to reduce transfer size.",
    "Minify JavaScript — Remove unused code to decrease page weight.",
    "Enable lazy loading — Load resources only when needed.",
    "Use green hosting — Switch to renewable-energy powered servers.",
];

/// The fallback list as owned strings.
pub fn fallback_recommendations() -> Vec<String> {
    FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
}

/// What the generator is told about the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    /// Scanned URL
    pub url: String,
    /// Country the visitor picked, if any
    pub country: Option<String>,
    /// Rounded grams per view
    pub co2_per_view_grams: f64,
    /// Measured or fallback page size
    pub page_bytes: u64,
    /// Score derived from the grams per view
    pub sustainability_score: f64,
}

impl ScanSummary {
    /// Prompt text sent to the model.
    pub fn prompt(&self) -> String {
        format!(
            "You are a web sustainability expert. \
             Return exactly 4 recommendations as JSON array of strings. \
             Each format: \"Title — Description\". \
             Keep under 100 chars. No markdown.\n\n\
             Website: {}, Country: {}, CO2 per view: {}g, Page size: {:.0}KB, \
             Sustainability score: {}.",
            self.url,
            self.country.as_deref().unwrap_or("Unknown"),
            self.co2_per_view_grams,
            self.page_bytes as f64 / 1024.0,
            self.sustainability_score,
        )
    }
}

/// Produces recommendations for a scan.
///
/// An `Ok` with an empty list and an `Err` are treated alike by callers:
/// the fixed fallback list is used.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Up to [`MAX_RECOMMENDATIONS`] short strings.
    async fn recommend(&self, summary: &ScanSummary) -> Result<Vec<String>>;
}

/// Always answers with an empty list, so the fallback applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecommender;

#[async_trait]
impl RecommendationService for NoRecommender {
    async fn recommend(&self, _summary: &ScanSummary) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Gemini `generateContent` client.
pub struct GeminiRecommender {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiRecommender {
    /// Create a client. Returns `None` when no API key is configured.
    pub fn from_config(config: &RecommenderConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl RecommendationService for GeminiRecommender {
    async fn recommend(&self, summary: &ScanSummary) -> Result<Vec<String>> {
        let payload = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": summary.prompt() } ] }
            ]
        });

        debug!("Requesting recommendations for {}", summary.url);

        let response = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .context("Failed to call Gemini generateContent API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error (status {}): {}", status, error_text);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        Ok(parse_recommendations(text))
    }
}

static JSON_ARRAY_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn json_array() -> Option<&'static Regex> {
    JSON_ARRAY_RE
        .get_or_init(|| Regex::new(r"\[[\s\S]*\]").ok())
        .as_ref()
}

/// Extract recommendations from model output.
///
/// The span from the first `[` to the last `]` is read as a JSON array of
/// strings. If that span exists but is not such an array, every line longer
/// than 10 characters (after trimming) is taken instead. No span at all
/// yields nothing. At most [`MAX_RECOMMENDATIONS`] are kept.
pub fn parse_recommendations(text: &str) -> Vec<String> {
    let Some(found) = json_array().and_then(|re| re.find(text)) else {
        return Vec::new();
    };

    let mut items = match serde_json::from_str::<Vec<String>>(found.as_str()) {
        Ok(items) => items,
        Err(e) => {
            warn!("Recommendation text is not a JSON string array ({}), splitting lines", e);
            text.lines()
                .filter(|l| l.trim().chars().count() > 10)
                .map(str::to_string)
                .collect()
        }
    };
    items.truncate(MAX_RECOMMENDATIONS);
    items
}
