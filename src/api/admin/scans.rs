use askama::Template;
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::{
    flash::{self, Flash},
    session::AppState,
};
use crate::api::views::ScanRow;
use crate::error::{AppError, Result};
use crate::services::signal;

// Upper bound accepted by the backend's raw scan endpoint
const MAX_LIMIT: u32 = 500;

#[derive(Template)]
#[template(path = "admin/scans.html")]
struct RawScansTemplate {
    flash: Option<Flash>,
    limit: u32,
    total_scans: usize,
    unique_ssids: usize,
    average_rssi: String,
    rows: Vec<ScanRow>,
}

#[derive(Deserialize)]
struct RawScansQuery {
    limit: Option<u32>,
}

/// Most recent raw scans, for debugging the scanning nodes
async fn raw_scans(
    State(state): State<AppState>,
    Query(query): Query<RawScansQuery>,
    session: Session,
) -> Result<RawScansTemplate> {
    let limit = query.limit.unwrap_or(state.config.raw_scan_limit);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let scans = state.backend.recent_scans(limit).await?;

    Ok(RawScansTemplate {
        flash: flash::take(&session).await,
        limit,
        total_scans: scans.len(),
        unique_ssids: signal::unique_ssids(&scans),
        average_rssi: signal::average_rssi_display(&scans),
        rows: ScanRow::from_scans(&scans, "Unknown"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/scans", get(raw_scans))
}
