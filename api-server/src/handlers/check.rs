//! URL check handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use phishguard_core::{Feature, RiskLevel, SafetyAssessment};

use crate::{AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckDetails {
    url_length: u64,
    https: bool,
    suspicious_keywords: u64,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    url: String,
    safety_score: u8,
    risk_level: RiskLevel,
    headline: &'static str,
    /// Percent, two decimals
    phishing_probability: f64,
    is_phishing: bool,
    explanations: Vec<String>,
    details: CheckDetails,
}

impl CheckResponse {
    fn new(url: String, assessment: SafetyAssessment) -> Self {
        let features = &assessment.features;
        Self {
            url,
            safety_score: assessment.safety_score,
            risk_level: assessment.risk_level,
            headline: assessment.risk_level.headline(),
            phishing_probability: assessment.prediction.phishing_percent(),
            is_phishing: assessment.prediction.is_phishing,
            details: CheckDetails {
                url_length: features.get(Feature::UrlLength) as u64,
                https: features.get(Feature::HasHttps) == 1.0,
                suspicious_keywords: features.get(Feature::NumSuspiciousKeywords) as u64,
            },
            explanations: assessment.explanations,
        }
    }
}

/// `POST /api/check` with `{"url": "..."}`
///
/// A missing body, bad JSON or missing `url` all count as an empty URL, so
/// the pipeline reports `NotTrained` before it complains about input.
pub async fn check_url(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> AppResult<Json<CheckResponse>> {
    let url = match payload {
        Ok(Json(req)) => req.url.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!("Unreadable check request: {}", rejection);
            String::new()
        }
    };

    let assessment = state.pipeline.score(&url)?;
    tracing::info!(
        score = assessment.safety_score,
        tier = %assessment.risk_level,
        "Checked url"
    );

    Ok(Json(CheckResponse::new(url.trim().to_string(), assessment)))
}
