//! `GET /api/fraud-check?address=` — neighborhood lease fraud lookup.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::fraud::FraudCheckResult;

#[derive(Deserialize)]
pub struct FraudParams {
    pub address: Option<String>,
}

/// Look up an address. The lookup itself never fails — a missing address
/// is the only error this endpoint can return.
pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<FraudParams>,
) -> Result<Json<FraudCheckResult>, ApiError> {
    let address = params
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or(ApiError::MissingParameter("address"))?;

    Ok(Json(state.fraud.search(&address).await))
}
