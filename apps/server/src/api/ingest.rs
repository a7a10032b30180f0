use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use wonfx_core::errors::Error;
use wonfx_core::ingest::IngestReport;

use crate::config::KOREA_EXIM_API_KEY;
use crate::error::ApiResult;
use crate::main_lib::AppState;

/// Run a full ingestion for today's KST date.
///
/// Always answers with JSON: the report on success (including the
/// primary-ok/secondary-degraded case), a structured error otherwise.
async fn run_ingest(State(state): State<Arc<AppState>>) -> ApiResult<Json<IngestReport>> {
    let service = state
        .ingest_service
        .as_ref()
        .ok_or_else(|| Error::MissingConfigKey(KOREA_EXIM_API_KEY.to_string()))?;

    let report = service.run().await?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ingest/run", post(run_ingest))
}
