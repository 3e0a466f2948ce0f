//! `GET /api/demo` — the static fallback report verbatim, for
//! demonstrations without invoking any producer.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::app_state::AppState;

pub async fn demo(State(state): State<AppState>) -> Json<Value> {
    Json(state.fallback.document().clone())
}
