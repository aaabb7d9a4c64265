use askama::Template;
use axum::{extract::State, routing::get, Router};
use tower_sessions::Session;

use crate::api::middleware::{
    flash::{self, Flash},
    session::AppState,
};
use crate::error::Result;
use crate::models::{Building, ScanSession};

const RECENT_SCANS: u32 = 10;
const PREVIEW_LEN: usize = 5;

struct ActiveSessionRow {
    building_name: String,
    room_name: String,
    started_at: String,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
struct AdminDashboardTemplate {
    flash: Option<Flash>,
    building_count: usize,
    room_count: usize,
    active_count: usize,
    session_count: usize,
    recent_scan_count: usize,
    recent_buildings: Vec<Building>,
    active_sessions: Vec<ActiveSessionRow>,
}

/// Admin overview of buildings, rooms and scanning activity
async fn admin_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<AdminDashboardTemplate> {
    let (buildings, rooms, sessions, recent) = tokio::try_join!(
        state.backend.list_buildings(),
        state.backend.list_rooms(None),
        state.backend.list_sessions(),
        state.backend.recent_scans(RECENT_SCANS),
    )?;

    let active: Vec<&ScanSession> = sessions.iter().filter(|s| s.is_active).collect();

    Ok(AdminDashboardTemplate {
        flash: flash::take(&session).await,
        building_count: buildings.len(),
        room_count: rooms.len(),
        active_count: active.len(),
        session_count: sessions.len(),
        recent_scan_count: recent.len(),
        active_sessions: active
            .iter()
            .take(PREVIEW_LEN)
            .map(|s| ActiveSessionRow {
                building_name: s.building_name.clone(),
                room_name: s.room_name.clone(),
                started_at: s.started_at_display(),
            })
            .collect(),
        recent_buildings: buildings.into_iter().take(PREVIEW_LEN).collect(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin", get(admin_dashboard))
}
