//! `POST /api/comprehension` — on-demand comprehension questions.
//!
//! Unlike the analysis endpoint this one has a visible failure mode:
//! comprehension is supplementary, so a generation failure is reported
//! rather than silently degraded.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::app_state::AppState;

#[derive(Deserialize)]
pub struct ComprehensionRequest {
    #[serde(rename = "riskAnalysis")]
    pub risk_analysis: Option<Value>,
    #[serde(rename = "finalReport")]
    pub final_report: Option<Value>,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<ComprehensionRequest>,
) -> Result<Json<Value>, ApiError> {
    let risk_analysis = payload
        .risk_analysis
        .ok_or(ApiError::MissingParameter("riskAnalysis"))?;
    let final_report = payload
        .final_report
        .ok_or(ApiError::MissingParameter("finalReport"))?;

    let block = state
        .comprehension
        .generate(&risk_analysis, &final_report)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Comprehension generation failed");
            ApiError::GenerationFailed(e.to_string())
        })?;

    Ok(Json(block))
}
